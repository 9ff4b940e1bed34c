//! Configuration types for agent creation.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    approximator::GrowthStrategy,
    encoding::TextEncoding,
    error::{Error, Result},
    learning::TdUpdate,
    policy::EpsilonGreedy,
    reward::{ExactMatchReward, OverlapReward},
};

/// Configuration for the Q-learning agent core.
///
/// This type provides a type-safe, builder-style API for configuring agents.
///
/// # Examples
///
/// ```
/// use qlearn::app::AgentConfig;
///
/// let config = AgentConfig::new()
///     .with_seed(42)
///     .with_gamma(0.9)
///     .with_epsilon_decay(0.99);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Discount factor γ in [0, 1)
    pub gamma: f64,
    /// Starting exploration rate
    pub epsilon: f64,
    /// Multiplicative decay applied after every learning step
    pub epsilon_decay: f64,
    /// Lower bound for epsilon (0 = no floor)
    pub min_epsilon: f64,
    /// Random seed for reproducibility
    pub seed: Option<u64>,
}

impl AgentConfig {
    /// Create a configuration with the defaults:
    /// - gamma: 0.99
    /// - epsilon: 1.0, decaying by 0.995 with no floor
    /// - seed: None (non-deterministic)
    pub fn new() -> Self {
        Self {
            gamma: 0.99,
            epsilon: 1.0,
            epsilon_decay: 0.995,
            min_epsilon: 0.0,
            seed: None,
        }
    }

    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    pub fn with_epsilon_decay(mut self, decay: f64) -> Self {
        self.epsilon_decay = decay;
        self
    }

    pub fn with_min_epsilon(mut self, min_epsilon: f64) -> Self {
        self.min_epsilon = min_epsilon;
        self
    }

    /// Set the random seed for deterministic behavior.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.policy()?;
        self.td_update()?;
        Ok(())
    }

    pub(crate) fn policy(&self) -> Result<EpsilonGreedy> {
        EpsilonGreedy::with_floor(self.epsilon, self.epsilon_decay, self.min_epsilon)
    }

    pub(crate) fn td_update(&self) -> Result<TdUpdate> {
        TdUpdate::new(self.gamma)
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Replay schedule run when a new action label appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// How the approximator is widened
    pub strategy: GrowthStrategy,
    /// Passes over every known pair after widening
    pub replay_passes: usize,
    /// Exploration rate used while replaying; restored afterwards
    pub replay_epsilon: f64,
    /// Repetitions of a pair whose answer was already known
    pub known_answer_passes: usize,
    /// Repetitions of the taught pair alone, on both paths
    pub imprint_passes: usize,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            strategy: GrowthStrategy::Rebuild,
            replay_passes: 20,
            replay_epsilon: 0.1,
            known_answer_passes: 50,
            imprint_passes: 100,
        }
    }
}

impl GrowthConfig {
    pub fn with_strategy(mut self, strategy: GrowthStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_replay_epsilon(mut self, epsilon: f64) -> Self {
        self.replay_epsilon = epsilon;
        self
    }

    pub fn with_passes(mut self, replay: usize, known_answer: usize, imprint: usize) -> Self {
        self.replay_passes = replay;
        self.known_answer_passes = known_answer;
        self.imprint_passes = imprint;
        self
    }
}

/// How a chatbot turns a (question, generated, expected) triple into a fit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatLearning {
    /// Q-learning with the expected answer's encoding standing in for the
    /// successor state; the expected answer's entry is pulled toward
    /// `overlap_reward + γ · max Q(encode(expected))`.
    Bootstrap,
    /// The expected answer's entry is pulled toward +hit when the greedy
    /// choice already matches it, else toward the miss signal.
    Classification,
    /// Regression toward the one-hot vector of the expected answer; the
    /// overlap reward only feeds statistics.
    #[default]
    Supervised,
}

impl fmt::Display for ChatLearning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatLearning::Bootstrap => write!(f, "bootstrap"),
            ChatLearning::Classification => write!(f, "classification"),
            ChatLearning::Supervised => write!(f, "supervised"),
        }
    }
}

impl FromStr for ChatLearning {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bootstrap" => Ok(ChatLearning::Bootstrap),
            "classification" | "classify" => Ok(ChatLearning::Classification),
            "supervised" => Ok(ChatLearning::Supervised),
            other => Err(Error::parse_option(
                "learning mode",
                other,
                "bootstrap, classification, supervised",
            )),
        }
    }
}

/// What to do when the expected answer has no registered index.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownLabelPolicy {
    /// Fail with `Error::UnknownAction`
    #[default]
    Reject,
    /// Silently train index 0 instead
    FallbackToFirst,
}

impl FromStr for UnknownLabelPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(UnknownLabelPolicy::Reject),
            "fallback" | "fallback-to-first" => Ok(UnknownLabelPolicy::FallbackToFirst),
            other => Err(Error::parse_option(
                "unknown-label policy",
                other,
                "reject, fallback",
            )),
        }
    }
}

/// Configuration for a chatbot built on the agent core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub learning: ChatLearning,
    pub unknown_label: UnknownLabelPolicy,
    pub encoding: TextEncoding,
    pub reward: OverlapReward,
    pub classification_reward: ExactMatchReward,
    pub growth: GrowthConfig,
    /// Rewards strictly above this count as hits
    pub hit_threshold: f64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            learning: ChatLearning::default(),
            unknown_label: UnknownLabelPolicy::default(),
            encoding: TextEncoding::default(),
            reward: OverlapReward::default(),
            classification_reward: ExactMatchReward::default(),
            growth: GrowthConfig::default(),
            hit_threshold: 5.0,
        }
    }
}

impl ChatConfig {
    pub fn with_learning(mut self, learning: ChatLearning) -> Self {
        self.learning = learning;
        self
    }

    pub fn with_unknown_label(mut self, policy: UnknownLabelPolicy) -> Self {
        self.unknown_label = policy;
        self
    }

    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn with_growth(mut self, growth: GrowthConfig) -> Self {
        self.growth = growth;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.growth.replay_epsilon) {
            return Err(Error::invalid_config(format!(
                "replay epsilon {} must lie in [0, 1]",
                self.growth.replay_epsilon
            )));
        }
        if self.reward.floor > self.reward.max {
            return Err(Error::invalid_config(format!(
                "reward floor {} exceeds reward maximum {}",
                self.reward.floor, self.reward.max
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(AgentConfig::default().validate().is_ok());
        assert!(ChatConfig::default().validate().is_ok());
        assert_eq!(GrowthConfig::default().replay_passes, 20);
        assert_eq!(GrowthConfig::default().imprint_passes, 100);
    }

    #[test]
    fn test_default_learning_is_supervised() {
        assert_eq!(ChatLearning::default(), ChatLearning::Supervised);
        assert_eq!(ChatConfig::default().learning, ChatLearning::Supervised);
    }

    #[test]
    fn test_invalid_agent_config() {
        assert!(AgentConfig::new().with_gamma(1.0).validate().is_err());
        assert!(AgentConfig::new().with_epsilon(-0.1).validate().is_err());
        assert!(AgentConfig::new().with_epsilon_decay(1.2).validate().is_err());
    }

    #[test]
    fn test_invalid_chat_config() {
        let mut config = ChatConfig::default();
        config.growth.replay_epsilon = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_modes() {
        assert_eq!(
            "classify".parse::<ChatLearning>().unwrap(),
            ChatLearning::Classification
        );
        assert_eq!(
            "fallback".parse::<UnknownLabelPolicy>().unwrap(),
            UnknownLabelPolicy::FallbackToFirst
        );
        assert!("guess".parse::<ChatLearning>().is_err());
    }
}
