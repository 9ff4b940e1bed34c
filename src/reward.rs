//! Reward signals for response selection

use serde::{Deserialize, Serialize};

/// Lexical-overlap reward between a generated and an expected answer.
///
/// Exact matches score `max`. Otherwise each generated token found among the
/// expected tokens counts once, and the score is
/// `matches / expected_tokens × max`, clamped into `[floor, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapReward {
    pub max: f64,
    pub floor: f64,
}

impl Default for OverlapReward {
    fn default() -> Self {
        Self {
            max: 10.0,
            floor: -1.0,
        }
    }
}

impl OverlapReward {
    pub fn new(max: f64, floor: f64) -> Self {
        Self { max, floor }
    }

    pub fn score(&self, generated: &str, expected: &str) -> f64 {
        let generated = generated.trim().to_lowercase();
        let expected = expected.trim().to_lowercase();
        if generated == expected {
            return self.max;
        }

        let expected_tokens: Vec<&str> = expected.split_whitespace().collect();
        if expected_tokens.is_empty() {
            return self.floor;
        }

        let matches = generated
            .split_whitespace()
            .filter(|token| expected_tokens.contains(token))
            .count();
        let raw = matches as f64 / expected_tokens.len() as f64 * self.max;
        raw.clamp(self.floor, self.max)
    }
}

/// Fixed reward for classification by index: `hit` on a match, else `miss`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExactMatchReward {
    pub hit: f64,
    pub miss: f64,
}

impl Default for ExactMatchReward {
    fn default() -> Self {
        Self {
            hit: 10.0,
            miss: -1.0,
        }
    }
}

impl ExactMatchReward {
    pub fn score(&self, predicted: usize, expected: usize) -> f64 {
        if predicted == expected {
            self.hit
        } else {
            self.miss
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_scores_max() {
        let reward = OverlapReward::default();
        assert_eq!(reward.score("bien gracias", "bien gracias"), 10.0);
        assert_eq!(reward.score("  Bien Gracias ", "bien gracias"), 10.0);
    }

    #[test]
    fn test_no_overlap_is_not_positive() {
        let reward = OverlapReward::default();
        let score = reward.score("no se", "bien gracias");
        assert!(score <= 0.0);
        assert!(score >= reward.floor);
    }

    #[test]
    fn test_partial_overlap() {
        let reward = OverlapReward::default();
        assert!((reward.score("buenos días", "buenos días que tal") - 5.0).abs() < 1e-12);
        assert!((reward.score("estoy bien", "estoy muy bien") - 20.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_tokens_are_capped() {
        let reward = OverlapReward::default();
        assert_eq!(reward.score("hola hola hola", "hola"), 10.0);
    }

    #[test]
    fn test_empty_expected() {
        let reward = OverlapReward::new(10.0, -5.0);
        assert_eq!(reward.score("", ""), 10.0);
        assert_eq!(reward.score("algo", "   "), -5.0);
    }

    #[test]
    fn test_exact_match_reward() {
        let reward = ExactMatchReward::default();
        assert_eq!(reward.score(2, 2), 10.0);
        assert_eq!(reward.score(1, 2), -1.0);
    }
}
