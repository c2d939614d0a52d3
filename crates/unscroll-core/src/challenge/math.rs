//! Math challenges: linear equations through quadratics.
//!
//! Every equation is derived answer-first, so the solution is always an exact
//! integer and answers cannot be memorized.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// An equation to solve for x.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MathChallenge {
    /// The rendered equation, e.g. `3x + 7 = 22`.
    pub display_text: String,
    /// What to do with it, e.g. `Solve for x`.
    pub prompt: String,
    pub correct_answer: i64,
    pub difficulty: u8,
}

pub fn generate(difficulty: u8, rng: &mut impl Rng) -> MathChallenge {
    match difficulty {
        1 => generate_linear_easy(rng),
        2 => generate_linear_medium(rng),
        3 => generate_linear_hard(rng),
        4 => generate_quadratic(rng),
        _ => generate_linear_medium(rng),
    }
}

/// Exact integer equality. For quadratics only the stored (larger) root is
/// accepted; the smaller root is rejected. That restriction is deliberate and
/// kept as-is.
pub fn validate(challenge: &MathChallenge, answer: i64) -> bool {
    answer == challenge.correct_answer
}

/// Level 1: one-step linear equations, e.g. `3x + 7 = 22`, `5x - 12 = 28`.
fn generate_linear_easy(rng: &mut impl Rng) -> MathChallenge {
    if rng.gen_range(0..2) == 0 {
        // ax + b = c
        let x = rng.gen_range(3..12);
        let a = rng.gen_range(3..9);
        let b = rng.gen_range(5..25);
        let c = a * x + b;
        MathChallenge {
            display_text: format!("{a}x + {b} = {c}"),
            prompt: "Solve for x".to_string(),
            correct_answer: x,
            difficulty: 1,
        }
    } else {
        // ax - b = c
        let x = rng.gen_range(4..15);
        let a = rng.gen_range(3..8);
        let b = rng.gen_range(5..20);
        let c = a * x - b;
        MathChallenge {
            display_text: format!("{a}x - {b} = {c}"),
            prompt: "Solve for x".to_string(),
            correct_answer: x,
            difficulty: 1,
        }
    }
}

/// Level 2: two-step equations with fractions, like terms, or variables on
/// both sides. E.g. `x/4 + 5 = 17`, `2x + 3x - 7 = 28`.
fn generate_linear_medium(rng: &mut impl Rng) -> MathChallenge {
    match rng.gen_range(0..3) {
        0 => {
            // x/a + b = c; x chosen divisible by a
            let a = rng.gen_range(2..7);
            let x = a * rng.gen_range(3..12);
            let b = rng.gen_range(3..15);
            let c = x / a + b;
            MathChallenge {
                display_text: format!("x/{a} + {b} = {c}"),
                prompt: "Solve for x".to_string(),
                correct_answer: x,
                difficulty: 2,
            }
        }
        1 => {
            // ax + bx + c = d (combine like terms)
            let x = rng.gen_range(3..12);
            let a = rng.gen_range(2..6);
            let b = rng.gen_range(2..6);
            let c = rng.gen_range(5..20);
            let d = (a + b) * x + c;
            MathChallenge {
                display_text: format!("{a}x + {b}x + {c} = {d}"),
                prompt: "Solve for x".to_string(),
                correct_answer: x,
                difficulty: 2,
            }
        }
        _ => {
            // ax - b = cx + d (variables on both sides, a > c)
            let x = rng.gen_range(2..10);
            let a = rng.gen_range(4..9);
            let c = rng.gen_range(1..a - 1);
            let b = rng.gen_range(1..15);
            let d = (a - c) * x - b;
            MathChallenge {
                display_text: format!("{a}x - {b} = {c}x + {d}"),
                prompt: "Solve for x".to_string(),
                correct_answer: x,
                difficulty: 2,
            }
        }
    }
}

/// Level 3: multi-step equations with parentheses.
/// E.g. `2(3x - 5) + 4 = 18`, `3(x + 4) - 2(x - 1) = 20`.
fn generate_linear_hard(rng: &mut impl Rng) -> MathChallenge {
    match rng.gen_range(0..3) {
        0 => {
            // a(bx + c) + d = result
            let x = rng.gen_range(2..10);
            let a = rng.gen_range(2..5);
            let b = rng.gen_range(2..5);
            let c = rng.gen_range(-5..10);
            let d = rng.gen_range(-10..15);
            let result = a * (b * x + c) + d;
            MathChallenge {
                display_text: format!(
                    "{a}({b}x {}) {} = {result}",
                    signed_term(c),
                    signed_term(d)
                ),
                prompt: "Solve for x".to_string(),
                correct_answer: x,
                difficulty: 3,
            }
        }
        1 => {
            // a(x + b) + c(x + d) = result
            let x = rng.gen_range(2..12);
            let a = rng.gen_range(2..5);
            let b = rng.gen_range(1..8);
            let c = rng.gen_range(1..4);
            let d = rng.gen_range(1..8);
            let result = a * (x + b) + c * (x + d);
            MathChallenge {
                display_text: format!("{a}(x + {b}) + {c}(x + {d}) = {result}"),
                prompt: "Solve for x".to_string(),
                correct_answer: x,
                difficulty: 3,
            }
        }
        _ => {
            // (ax + b)/c = d; b derived so the division is exact
            let c = rng.gen_range(2..6);
            let d = rng.gen_range(3..12);
            let a = rng.gen_range(2..5);
            let x = rng.gen_range(2..10);
            let b = c * d - a * x;
            MathChallenge {
                display_text: format!("({a}x {}) / {c} = {d}", signed_term(b)),
                prompt: "Solve for x".to_string(),
                correct_answer: x,
                difficulty: 3,
            }
        }
    }
}

/// Level 4: quadratics built from two positive integer roots.
/// `(x - r1)(x - r2) = 0` rendered as `x² - (r1+r2)·x + r1·r2 = 0`.
/// The accepted answer is the larger root only.
fn generate_quadratic(rng: &mut impl Rng) -> MathChallenge {
    let r1 = rng.gen_range(1..10);
    let r2 = rng.gen_range(1..10);

    let b = -(r1 + r2);
    let c = r1 * r2;

    MathChallenge {
        display_text: format!("x² {}·x {} = 0", signed_term(b), signed_term(c)),
        prompt: "Find a positive root".to_string(),
        correct_answer: r1.max(r2),
        difficulty: 4,
    }
}

fn signed_term(n: i64) -> String {
    if n >= 0 {
        format!("+ {n}")
    } else {
        format!("- {}", -n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg64Mcg;

    /// Parse `Ax + B = C` / `Ax - B = C` and check the stored answer solves it.
    fn check_linear_easy(challenge: &MathChallenge) {
        let (lhs, rhs) = challenge.display_text.split_once(" = ").unwrap();
        let c: i64 = rhs.trim().parse().unwrap();

        let (a_part, b_part, sign) = if lhs.contains(" + ") {
            let (a, b) = lhs.split_once(" + ").unwrap();
            (a, b, 1)
        } else {
            let (a, b) = lhs.split_once(" - ").unwrap();
            (a, b, -1)
        };
        let a: i64 = a_part.trim_end_matches('x').parse().unwrap();
        let b: i64 = b_part.trim().parse().unwrap();

        assert_eq!(a * challenge.correct_answer + sign * b, c, "{}", challenge.display_text);
    }

    #[test]
    fn linear_easy_answer_satisfies_equation() {
        let mut rng = Pcg64Mcg::seed_from_u64(11);
        for _ in 0..200 {
            let challenge = generate(1, &mut rng);
            assert_eq!(challenge.difficulty, 1);
            check_linear_easy(&challenge);
        }
    }

    #[test]
    fn medium_and_hard_produce_positive_integer_answers() {
        let mut rng = Pcg64Mcg::seed_from_u64(13);
        for difficulty in [2u8, 3] {
            for _ in 0..200 {
                let challenge = generate(difficulty, &mut rng);
                assert_eq!(challenge.difficulty, difficulty);
                assert!(challenge.correct_answer > 0);
                assert!(challenge.display_text.contains('='));
                assert_eq!(challenge.prompt, "Solve for x");
            }
        }
    }

    /// Parse `x² - S·x + P = 0` back into coefficients and check the stored
    /// answer is the larger of the two roots.
    #[test]
    fn quadratic_answer_is_the_larger_root() {
        let mut rng = Pcg64Mcg::seed_from_u64(17);
        for _ in 0..200 {
            let challenge = generate(4, &mut rng);
            let body = challenge
                .display_text
                .strip_prefix("x² ")
                .and_then(|s| s.strip_suffix(" = 0"))
                .unwrap();
            let (b_term, c_term) = body.split_once("·x ").unwrap();
            let sum = -parse_signed(b_term);
            let product = parse_signed(c_term);

            let x = challenge.correct_answer;
            // Root of x² - sum·x + product
            assert_eq!(x * x - sum * x + product, 0, "{}", challenge.display_text);
            // Larger root: the co-root sum - x must not exceed it
            assert!(x >= sum - x, "{}", challenge.display_text);
        }
    }

    fn parse_signed(term: &str) -> i64 {
        let (sign, digits) = term.trim().split_once(' ').unwrap();
        let value: i64 = digits.trim().parse().unwrap();
        if sign == "-" {
            -value
        } else {
            value
        }
    }

    #[test]
    fn quadratic_rejects_the_smaller_root() {
        // Fixed roots 2 and 7: x² - 9·x + 14 = 0, only 7 validates.
        let challenge = MathChallenge {
            display_text: "x² - 9·x + 14 = 0".to_string(),
            prompt: "Find a positive root".to_string(),
            correct_answer: 7,
            difficulty: 4,
        };
        assert!(validate(&challenge, 7));
        assert!(!validate(&challenge, 2));
    }

    #[test]
    fn known_coefficients_render_as_expected() {
        // a=3, b=7, x=5 must display "3x + 7 = 22" and accept 5.
        let challenge = MathChallenge {
            display_text: format!("{}x + {} = {}", 3, 7, 3 * 5 + 7),
            prompt: "Solve for x".to_string(),
            correct_answer: 5,
            difficulty: 1,
        };
        assert_eq!(challenge.display_text, "3x + 7 = 22");
        assert!(validate(&challenge, 5));
        assert!(!validate(&challenge, 4));
    }

    #[test]
    fn unknown_difficulty_falls_back_to_medium() {
        let mut rng = Pcg64Mcg::seed_from_u64(19);
        let challenge = generate(0, &mut rng);
        assert_eq!(challenge.difficulty, 2);
    }
}
