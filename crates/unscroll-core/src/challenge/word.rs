//! Word challenges: unscramble an anagram of a focus-themed word.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordChallenge {
    /// The correct answer.
    pub original_word: String,
    /// The jumbled letters shown to the user.
    pub scrambled_word: String,
    pub difficulty: u8,
}

const WORDS_5_LETTERS: &[&str] = &[
    "FOCUS", "BRAIN", "THINK", "GOALS", "PEACE", "RELAX", "QUIET", "AWARE", "CLEAR", "DREAM",
    "DRIVE", "FRESH", "POWER", "SPARK", "TRUTH", "VALUE", "WORTH", "LIGHT", "SMILE", "TRUST",
];

const WORDS_6_LETTERS: &[&str] = &[
    "MENTAL", "BREATH", "GROWTH", "INTENT", "DESIRE", "EFFORT", "ENERGY", "HEALTH", "CHANGE",
    "WISDOM", "REASON", "SPIRIT", "CHOICE", "ACTION", "WONDER", "LISTEN", "VISION", "MOMENT",
    "HUMBLE", "HONEST",
];

const WORDS_7_LETTERS: &[&str] = &[
    "MINDFUL", "BALANCE", "CLARITY", "HEALING", "PURPOSE", "COURAGE", "FREEDOM", "MORNING",
    "PATIENT", "PRESENT", "REFLECT", "BELIEVE", "ACHIEVE", "INSPIRE", "CONNECT", "EMBRACE",
    "GENUINE", "THOUGHT", "IMPROVE", "JOURNEY",
];

const WORDS_8_PLUS_LETTERS: &[&str] = &[
    "AWARENESS", "GRATITUDE", "INTENTION", "RESILIENT", "TRANSFORM", "BREATHING", "STILLNESS",
    "POTENTIAL", "DEDICATED", "CONFIDENT", "MOTIVATED", "EMPOWERED", "MEDITATE", "PROGRESS",
    "STRENGTH", "OPTIMIZE", "POSITIVE", "CREATIVE", "PATIENCE", "SERENITY",
];

/// Word length buckets: 5 / 6 / 7 / 8+ letters by difficulty.
pub fn generate(difficulty: u8, rng: &mut impl Rng) -> WordChallenge {
    let pool = match difficulty {
        1 => WORDS_5_LETTERS,
        2 => WORDS_6_LETTERS,
        3 => WORDS_7_LETTERS,
        _ => WORDS_8_PLUS_LETTERS,
    };

    let original = pool[rng.gen_range(0..pool.len())];
    WordChallenge {
        original_word: original.to_string(),
        scrambled_word: scramble(original, rng),
        difficulty: difficulty.clamp(1, 4),
    }
}

/// Uniform permutation, retried up to 10 times if it reproduces the input.
/// If it still matches (possible for words with repeated letters), fall back
/// to swapping the first two letters, so `scrambled != original` holds for
/// any word of length >= 2.
fn scramble(word: &str, rng: &mut impl Rng) -> String {
    let mut scrambled = String::new();
    for _ in 0..10 {
        let mut chars: Vec<char> = word.chars().collect();
        // Fisher-Yates
        for i in (1..chars.len()).rev() {
            let j = rng.gen_range(0..=i);
            chars.swap(i, j);
        }
        scrambled = chars.into_iter().collect();
        if scrambled != word {
            return scrambled;
        }
    }

    if word.chars().count() >= 2 {
        let mut chars: Vec<char> = word.chars().collect();
        chars.swap(0, 1);
        return chars.into_iter().collect();
    }
    scrambled
}

/// Trimmed, case-insensitive equality against the original word.
pub fn validate(challenge: &WordChallenge, user_answer: &str) -> bool {
    challenge
        .original_word
        .eq_ignore_ascii_case(user_answer.trim())
}
