//! Reflection challenges: a written answer to a prompt, with anti-gaming
//! validation.
//!
//! The validator runs a fixed pipeline and short-circuits on the first
//! failure: character floor, word count, unique-word ratio, gibberish
//! substrings, average word length, repeated-letter runs.

use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReflectionChallenge {
    pub prompt: String,
    pub minimum_words: usize,
    pub difficulty: u8,
}

/// Outcome of validating a reflection response. The negative cases are not
/// errors; they drive the retry/escalation flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    TooShort { actual: usize, required: usize },
    TooRepetitive,
    Suspicious,
}

const LEVEL1_PROMPTS: &[&str] = &[
    "Why do you want to open this app right now?",
    "What do you hope to get from using this app?",
    "How are you feeling right now, and why did you reach for your phone?",
    "What would be a better use of the next 10 minutes?",
];

const LEVEL2_PROMPTS: &[&str] = &[
    "What specific thing do you need to do in this app? Be detailed.",
    "What were you doing before you reached for your phone?",
    "Describe your current emotional state and why you want this distraction.",
    "What task or responsibility are you putting off right now?",
];

const LEVEL3_PROMPTS: &[&str] = &[
    "Describe what you're avoiding by opening this app, and what you should be doing instead.",
    "How will you feel in 30 minutes if you spend that time on this app?",
    "What is one meaningful thing you could accomplish instead of scrolling?",
    "Describe how your phone habits have affected your productivity this week.",
];

const LEVEL4_PROMPTS: &[&str] = &[
    "Write about a time this app negatively affected your productivity or mood. What would you do differently?",
    "Imagine your ideal self watching you right now. What would they say about this choice?",
    "Describe your relationship with this app. Is it serving you, or are you serving it?",
    "What would your life look like if you spent half as much time on apps like this one?",
];

/// Keyboard-mash and filler fragments that disqualify a response.
const SUSPICIOUS_PATTERNS: &[&str] = &[
    "asdf", "qwer", "zxcv", "jkl", "aaa", "bbb", "ccc", "ddd", "xxx", "yyy", "zzz", "123", "abc",
    "test", "blah",
];

pub fn generate(difficulty: u8, rng: &mut impl Rng) -> ReflectionChallenge {
    let (prompts, minimum_words) = match difficulty {
        1 => (LEVEL1_PROMPTS, 15),
        2 => (LEVEL2_PROMPTS, 20),
        3 => (LEVEL3_PROMPTS, 25),
        _ => (LEVEL4_PROMPTS, 30),
    };
    ReflectionChallenge {
        prompt: prompts[rng.gen_range(0..prompts.len())].to_string(),
        minimum_words,
        difficulty: difficulty.clamp(1, 4),
    }
}

pub fn validate(response: &str, minimum_words: usize) -> ValidationResult {
    let trimmed = response.trim();

    if trimmed.len() < 10 {
        return ValidationResult::TooShort {
            actual: 0,
            required: minimum_words,
        };
    }

    let words: Vec<&str> = trimmed.split_whitespace().collect();
    let word_count = words.len();

    if word_count < minimum_words {
        return ValidationResult::TooShort {
            actual: word_count,
            required: minimum_words,
        };
    }

    let unique: std::collections::HashSet<String> =
        words.iter().map(|w| w.to_lowercase()).collect();
    let unique_ratio = unique.len() as f32 / word_count as f32;
    if unique_ratio < 0.4 {
        return ValidationResult::TooRepetitive;
    }

    let lower = trimmed.to_lowercase();
    if SUSPICIOUS_PATTERNS.iter().any(|p| lower.contains(p)) {
        return ValidationResult::Suspicious;
    }

    let avg_word_len =
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f32 / word_count as f32;
    if avg_word_len < 2.5 {
        return ValidationResult::Suspicious;
    }

    if has_excessive_repeating_chars(trimmed) {
        return ValidationResult::Suspicious;
    }

    ValidationResult::Valid
}

/// Number of whitespace-separated words.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Four or more consecutive identical letters anywhere in the text.
fn has_excessive_repeating_chars(text: &str) -> bool {
    let mut consecutive = 1;
    let mut last_char = ' ';
    for ch in text.chars() {
        if ch == last_char && ch.is_alphabetic() {
            consecutive += 1;
            if consecutive >= 4 {
                return true;
            }
        } else {
            consecutive = 1;
        }
        last_char = ch;
    }
    false
}
