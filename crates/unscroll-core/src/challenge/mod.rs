//! Challenge generation, validation and weighted selection.
//!
//! A challenge is a tagged union over six kinds. Instances are immutable,
//! created fresh per attempt, owned by the active session and never persisted.
//! Adding a kind means one variant here, one generator module and one
//! validator arm in the session controller; exhaustive matches catch the rest.

pub mod breathing;
pub mod math;
pub mod memory;
pub mod reflection;
pub mod typing;
pub mod word;

use rand::Rng;
use serde::{Deserialize, Serialize};

pub use breathing::{BreathingChallenge, BreathingPhase};
pub use math::MathChallenge;
pub use memory::MemoryChallenge;
pub use reflection::{ReflectionChallenge, ValidationResult};
pub use typing::TypingChallenge;
pub use word::WordChallenge;

/// Lowest and highest supported difficulty. The escalation policy only emits
/// 2-4; level 1 remains generatable for hosts that want an easy mode.
pub const MIN_DIFFICULTY: u8 = 1;
pub const MAX_DIFFICULTY: u8 = 4;

/// One challenge instance at a fixed difficulty.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Challenge {
    Math(MathChallenge),
    Typing(TypingChallenge),
    Reflection(ReflectionChallenge),
    Memory(MemoryChallenge),
    Word(WordChallenge),
    Breathing(BreathingChallenge),
}

/// Bare challenge discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChallengeKind {
    Math,
    Typing,
    Reflection,
    Memory,
    Word,
    Breathing,
}

impl Challenge {
    pub fn difficulty(&self) -> u8 {
        match self {
            Challenge::Math(c) => c.difficulty,
            Challenge::Typing(c) => c.difficulty,
            Challenge::Reflection(c) => c.difficulty,
            Challenge::Memory(c) => c.difficulty,
            Challenge::Word(c) => c.difficulty,
            Challenge::Breathing(c) => c.difficulty,
        }
    }

    pub fn kind(&self) -> ChallengeKind {
        match self {
            Challenge::Math(_) => ChallengeKind::Math,
            Challenge::Typing(_) => ChallengeKind::Typing,
            Challenge::Reflection(_) => ChallengeKind::Reflection,
            Challenge::Memory(_) => ChallengeKind::Memory,
            Challenge::Word(_) => ChallengeKind::Word,
            Challenge::Breathing(_) => ChallengeKind::Breathing,
        }
    }
}

// Selection weights, out of 100.
const MATH_WEIGHT: u32 = 20;
const TYPING_WEIGHT: u32 = 10;
const REFLECTION_WEIGHT: u32 = 10;
const MEMORY_WEIGHT: u32 = 25;
const WORD_WEIGHT: u32 = 20;
const BREATHING_WEIGHT: u32 = 15;

/// Pick a challenge kind from a uniform roll in [0, 100).
fn kind_for_roll(roll: u32) -> ChallengeKind {
    let mut threshold = MATH_WEIGHT;
    if roll < threshold {
        return ChallengeKind::Math;
    }
    threshold += TYPING_WEIGHT;
    if roll < threshold {
        return ChallengeKind::Typing;
    }
    threshold += REFLECTION_WEIGHT;
    if roll < threshold {
        return ChallengeKind::Reflection;
    }
    threshold += MEMORY_WEIGHT;
    if roll < threshold {
        return ChallengeKind::Memory;
    }
    threshold += WORD_WEIGHT;
    if roll < threshold {
        return ChallengeKind::Word;
    }
    let _ = BREATHING_WEIGHT;
    ChallengeKind::Breathing
}

/// Generate a random challenge at the given difficulty.
///
/// Kind is chosen by weighted roll (Math 20, Typing 10, Reflection 10,
/// Memory 25, Word 20, Breathing 15); difficulty is clamped to [1, 4].
pub fn generate(difficulty: u8, rng: &mut impl Rng) -> Challenge {
    let kind = kind_for_roll(rng.gen_range(0..100));
    generate_of_kind(kind, difficulty, rng)
}

/// Generate a challenge of a specific kind at the given difficulty.
pub fn generate_of_kind(kind: ChallengeKind, difficulty: u8, rng: &mut impl Rng) -> Challenge {
    let difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    match kind {
        ChallengeKind::Math => Challenge::Math(math::generate(difficulty, rng)),
        ChallengeKind::Typing => Challenge::Typing(typing::generate(difficulty, rng)),
        ChallengeKind::Reflection => Challenge::Reflection(reflection::generate(difficulty, rng)),
        ChallengeKind::Memory => Challenge::Memory(memory::generate(difficulty, rng)),
        ChallengeKind::Word => Challenge::Word(word::generate(difficulty, rng)),
        ChallengeKind::Breathing => Challenge::Breathing(breathing::generate(difficulty)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn roll_thresholds_match_weights() {
        assert_eq!(kind_for_roll(0), ChallengeKind::Math);
        assert_eq!(kind_for_roll(19), ChallengeKind::Math);
        assert_eq!(kind_for_roll(20), ChallengeKind::Typing);
        assert_eq!(kind_for_roll(29), ChallengeKind::Typing);
        assert_eq!(kind_for_roll(30), ChallengeKind::Reflection);
        assert_eq!(kind_for_roll(39), ChallengeKind::Reflection);
        assert_eq!(kind_for_roll(40), ChallengeKind::Memory);
        assert_eq!(kind_for_roll(64), ChallengeKind::Memory);
        assert_eq!(kind_for_roll(65), ChallengeKind::Word);
        assert_eq!(kind_for_roll(84), ChallengeKind::Word);
        assert_eq!(kind_for_roll(85), ChallengeKind::Breathing);
        assert_eq!(kind_for_roll(99), ChallengeKind::Breathing);
    }

    #[test]
    fn difficulty_is_clamped_before_dispatch() {
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        let challenge = generate_of_kind(ChallengeKind::Memory, 0, &mut rng);
        assert_eq!(challenge.difficulty(), 1);

        let challenge = generate_of_kind(ChallengeKind::Memory, 9, &mut rng);
        assert_eq!(challenge.difficulty(), 4);
    }

    #[test]
    fn every_kind_generates_at_every_difficulty() {
        let mut rng = Pcg64Mcg::seed_from_u64(42);
        let kinds = [
            ChallengeKind::Math,
            ChallengeKind::Typing,
            ChallengeKind::Reflection,
            ChallengeKind::Memory,
            ChallengeKind::Word,
            ChallengeKind::Breathing,
        ];
        for kind in kinds {
            for difficulty in 1..=4 {
                let challenge = generate_of_kind(kind, difficulty, &mut rng);
                assert_eq!(challenge.kind(), kind);
                assert_eq!(challenge.difficulty(), difficulty);
            }
        }
    }

    #[test]
    fn weighted_selection_hits_all_kinds_eventually() {
        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(generate(3, &mut rng).kind());
        }
        assert_eq!(seen.len(), 6);
    }

    #[test]
    fn snapshot_serializes_with_kind_tag() {
        let mut rng = Pcg64Mcg::seed_from_u64(3);
        let challenge = generate_of_kind(ChallengeKind::Word, 2, &mut rng);
        let json = serde_json::to_string(&challenge).unwrap();
        assert!(json.contains("\"kind\":\"word\""));
        let back: Challenge = serde_json::from_str(&json).unwrap();
        assert_eq!(back.kind(), ChallengeKind::Word);
    }
}
