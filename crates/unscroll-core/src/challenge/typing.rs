//! Typing challenges: reproduce a focus-themed phrase exactly.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingChallenge {
    pub text_to_type: String,
    pub difficulty: u8,
}

const LEVEL1_PHRASES: &[&str] = &[
    "The quick brown fox jumps",
    "Stay focused and be present",
    "Your time is valuable",
    "Choose your actions wisely",
    "Break the scroll habit now",
    "Focus on what matters most",
    "Be intentional with your time",
    "Your attention is precious",
    "Take control of your day",
    "Every moment counts",
];

const LEVEL2_PHRASES: &[&str] = &[
    "Patience is a virtue that leads to success",
    "Every moment of resistance makes you stronger",
    "What you do today shapes who you become tomorrow",
    "Discipline is choosing what you want most over what you want now",
    "The secret of getting ahead is getting started today",
    "Small daily improvements lead to stunning long-term results",
    "Your future self will thank you for the choices you make now",
    "Consistency is more important than perfection in building habits",
];

const LEVEL3_PHRASES: &[&str] = &[
    "Before you scroll mindlessly, ask yourself: Is this worth my time?",
    "The best way to predict your future is to create it, not consume it.",
    "Your attention is your most valuable resource. Spend it wisely today.",
    "The difference between who you are and who you want to be is what you do.",
    "Success is the sum of small efforts repeated day in and day out, consistently.",
    "You will never change your life until you change something you do daily.",
];

const LEVEL4_PHRASES: &[&str] = &[
    "In 2024, the average person spends 4+ hours daily on social media. Be different!",
    "Step 1: Put down your phone. Step 2: Take a deep breath. Step 3: Do something real.",
    "Ask yourself: Will I remember this scroll session in 5 years? Probably not. Act accordingly!",
    "The chains of habit are too light to be felt until they are too heavy to be broken. Break them now.",
    "Your phone is a tool, not a pacifier. Use it with intention, not out of boredom or anxiety.",
    "Time is the most valuable thing you can spend. Don't waste it on endless scrolling and notifications.",
];

pub fn generate(difficulty: u8, rng: &mut impl Rng) -> TypingChallenge {
    let phrases = match difficulty {
        1 => LEVEL1_PHRASES,
        2 => LEVEL2_PHRASES,
        3 => LEVEL3_PHRASES,
        _ => LEVEL4_PHRASES,
    };
    TypingChallenge {
        text_to_type: phrases[rng.gen_range(0..phrases.len())].to_string(),
        difficulty: difficulty.clamp(1, 4),
    }
}

/// Exact, case-sensitive match.
pub fn validate(expected: &str, actual: &str) -> bool {
    expected == actual
}

/// Per-position match flags for live feedback while the user types.
pub fn character_matches(expected: &str, actual: &str) -> Vec<bool> {
    let expected: Vec<char> = expected.chars().collect();
    actual
        .chars()
        .enumerate()
        .map(|(i, ch)| expected.get(i) == Some(&ch))
        .collect()
}

/// Length of the correct prefix typed so far; stops counting at the first
/// mistake.
pub fn correct_prefix_len(expected: &str, actual: &str) -> usize {
    expected
        .chars()
        .zip(actual.chars())
        .take_while(|(e, a)| e == a)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    #[test]
    fn validation_is_case_sensitive_and_exact() {
        assert!(validate("Stay focused", "Stay focused"));
        assert!(!validate("Stay focused", "stay focused"));
        assert!(!validate("Stay focused", "Stay focused "));
    }

    #[test]
    fn generated_phrase_comes_from_the_difficulty_pool() {
        let mut rng = Pcg64Mcg::seed_from_u64(5);
        for _ in 0..50 {
            let challenge = generate(2, &mut rng);
            assert!(LEVEL2_PHRASES.contains(&challenge.text_to_type.as_str()));
            assert_eq!(challenge.difficulty, 2);
        }
    }

    #[test]
    fn character_matches_flag_positions() {
        let matches = character_matches("abc", "axc");
        assert_eq!(matches, vec![true, false, true]);

        // Typing past the end is always wrong.
        let matches = character_matches("ab", "abcd");
        assert_eq!(matches, vec![true, true, false, false]);
    }

    #[test]
    fn prefix_count_stops_at_first_error() {
        assert_eq!(correct_prefix_len("focus", "focus"), 5);
        assert_eq!(correct_prefix_len("focus", "foxus"), 2);
        assert_eq!(correct_prefix_len("focus", ""), 0);
    }
}
