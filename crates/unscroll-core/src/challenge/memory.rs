//! Memory challenges: watch a sequence of tiles flash, then reproduce it.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Number of distinct items (tiles/colors) a sequence draws from.
pub const ITEM_COUNT: usize = 6;

const BASE_DISPLAY_TIME_MS: u64 = 3000;
const FLASH_PER_ITEM_MS: u64 = 600;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryChallenge {
    /// Item indices to remember, each in [0, ITEM_COUNT).
    pub sequence: Vec<usize>,
    /// How long the host should show the sequence.
    pub display_time_ms: u64,
    pub difficulty: u8,
}

/// Sequence lengths: 4 / 5 / 6 / 8 by difficulty. Items repeat freely.
pub fn generate(difficulty: u8, rng: &mut impl Rng) -> MemoryChallenge {
    let sequence_length = match difficulty {
        1 => 4,
        2 => 5,
        3 => 6,
        _ => 8,
    };

    let sequence = (0..sequence_length)
        .map(|_| rng.gen_range(0..ITEM_COUNT))
        .collect::<Vec<_>>();

    MemoryChallenge {
        display_time_ms: BASE_DISPLAY_TIME_MS + sequence_length as u64 * FLASH_PER_ITEM_MS,
        sequence,
        difficulty: difficulty.clamp(1, 4),
    }
}

/// Exact ordered equality.
pub fn validate(challenge: &MemoryChallenge, user_sequence: &[usize]) -> bool {
    challenge.sequence == user_sequence
}
