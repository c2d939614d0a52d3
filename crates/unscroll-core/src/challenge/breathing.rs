//! Breathing challenges: timed box-breathing cycles.
//!
//! There is no validator. Completing all cycles is unconditionally a success;
//! each phase is wall-clock timed, so the exercise cannot be rushed, only
//! abandoned.

use serde::{Deserialize, Serialize};

// Standard 4-4-4 box breathing.
const DEFAULT_INHALE_SECONDS: u32 = 4;
const DEFAULT_HOLD_SECONDS: u32 = 4;
const DEFAULT_EXHALE_SECONDS: u32 = 4;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreathingChallenge {
    pub cycles: u32,
    pub inhale_seconds: u32,
    pub hold_seconds: u32,
    pub exhale_seconds: u32,
    pub difficulty: u8,
}

impl BreathingChallenge {
    pub fn total_duration_seconds(&self) -> u32 {
        self.cycles * (self.inhale_seconds + self.hold_seconds + self.exhale_seconds)
    }
}

/// Current phase within a breathing cycle, for hosts that animate it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreathingPhase {
    Inhale,
    Hold,
    Exhale,
    Complete,
}

/// Cycle counts: 2 / 3 / 3 / 4 by difficulty (24-48 seconds total).
pub fn generate(difficulty: u8) -> BreathingChallenge {
    let cycles = match difficulty {
        1 => 2,
        2 | 3 => 3,
        _ => 4,
    };

    BreathingChallenge {
        cycles,
        inhale_seconds: DEFAULT_INHALE_SECONDS,
        hold_seconds: DEFAULT_HOLD_SECONDS,
        exhale_seconds: DEFAULT_EXHALE_SECONDS,
        difficulty: difficulty.clamp(1, 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_counts_by_difficulty() {
        assert_eq!(generate(1).cycles, 2);
        assert_eq!(generate(2).cycles, 3);
        assert_eq!(generate(3).cycles, 3);
        assert_eq!(generate(4).cycles, 4);
    }

    #[test]
    fn total_duration_is_cycles_times_phase_sum() {
        let challenge = generate(4);
        assert_eq!(challenge.total_duration_seconds(), 4 * 12);
        assert_eq!(generate(1).total_duration_seconds(), 24);
    }
}
