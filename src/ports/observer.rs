//! Observer port - abstraction for training observation and data collection
//!
//! This port defines the interface for observing training events,
//! allowing composable data collection without coupling training
//! logic to specific output formats or metrics.

use serde::{Deserialize, Serialize};

use crate::{Result, approximator::GrowthStrategy};

/// What happened during one training episode.
///
/// `steps` counts agent decisions; `successes` counts the decisions that
/// met the task's success criterion (goal reached, letter guessed, reply
/// above the hit threshold).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeSummary {
    /// 1-based episode number
    pub episode: usize,
    pub steps: usize,
    pub successes: usize,
    pub total_reward: f64,
    /// Exploration rate after the episode
    pub epsilon: f64,
}

impl EpisodeSummary {
    /// Fraction of successful steps, 0 for an empty episode.
    pub fn accuracy(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.successes as f64 / self.steps as f64
        }
    }

    pub fn mean_reward(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.total_reward / self.steps as f64
        }
    }
}

/// A new action label widened the action space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthEvent {
    pub label: String,
    pub action_count: usize,
    pub strategy: GrowthStrategy,
    /// Known pairs re-presented after widening (per pass)
    pub replayed_pairs: usize,
}

/// Observer trait for monitoring training
///
/// Observers can be composed to collect different types of data during training.
/// Examples include:
/// - Progress bars for user feedback
/// - Periodic log reports
/// - CSV export for analysis
/// - Metrics tracking for evaluation
///
/// # Event Sequence
///
/// 1. `on_training_start(total_episodes)` - Once at the beginning
/// 2. `on_episode_end(summary)` - After every episode
/// 3. `on_growth(event)` - Whenever the action space grows
/// 4. `on_training_end()` - Once at the end
///
/// # Examples
///
/// ```no_run
/// use qlearn::ports::{EpisodeSummary, Observer};
///
/// struct RewardSum {
///     total: f64,
/// }
///
/// impl Observer for RewardSum {
///     fn on_episode_end(&mut self, summary: &EpisodeSummary) -> qlearn::Result<()> {
///         self.total += summary.total_reward;
///         Ok(())
///     }
/// }
/// ```
pub trait Observer: Send {
    /// Called when training starts.
    ///
    /// # Default Implementation
    ///
    /// Does nothing. Override to initialize observation state.
    fn on_training_start(&mut self, _total_episodes: usize) -> Result<()> {
        Ok(())
    }

    /// Called when an episode completes.
    fn on_episode_end(&mut self, _summary: &EpisodeSummary) -> Result<()> {
        Ok(())
    }

    /// Called after the action space grew and known pairs were replayed.
    fn on_growth(&mut self, _event: &GrowthEvent) -> Result<()> {
        Ok(())
    }

    /// Called when training completes.
    ///
    /// Use this to finalize outputs, close files, or display summaries.
    fn on_training_end(&mut self) -> Result<()> {
        Ok(())
    }
}
