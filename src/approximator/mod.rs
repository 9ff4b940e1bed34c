//! Value approximators
//!
//! A value approximator maps a state vector to one Q-value per action. The
//! agent only talks to the [`ValueApproximator`] trait, so any gradient-based
//! model can back it; [`Mlp`] is the bundled implementation.
//!
//! ## Growth
//!
//! When the action space grows the approximator must widen its output layer
//! before the next inference. Two strategies are available:
//!
//! | Strategy | Parameters after growth | Prior estimates |
//! |----------|-------------------------|-----------------|
//! | [`GrowthStrategy::Rebuild`] | fresh | lost, recovered by replay |
//! | [`GrowthStrategy::PreserveWeights`] | existing kept, new output units fresh | kept |

pub mod mlp;

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub use mlp::{Mlp, NetworkConfig};

use crate::error::{Error, Result};

/// How an approximator widens its output when new actions appear.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthStrategy {
    /// Discard all parameters and start over at the new width.
    #[default]
    Rebuild,
    /// Keep existing parameters and initialize only the new output units.
    PreserveWeights,
}

impl fmt::Display for GrowthStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrowthStrategy::Rebuild => write!(f, "rebuild"),
            GrowthStrategy::PreserveWeights => write!(f, "preserve"),
        }
    }
}

impl FromStr for GrowthStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rebuild" => Ok(GrowthStrategy::Rebuild),
            "preserve" | "preserve-weights" => Ok(GrowthStrategy::PreserveWeights),
            other => Err(Error::parse_option("growth strategy", other, "rebuild, preserve")),
        }
    }
}

/// Parameterized function from a state vector to one value per action.
pub trait ValueApproximator {
    /// Expected length of input state vectors.
    fn state_size(&self) -> usize;

    /// Current output width.
    fn action_count(&self) -> usize;

    /// Evaluate the Q-values of `state`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::StateSizeMismatch`] if `state` has the wrong length.
    fn predict(&self, state: &[f64]) -> Result<Vec<f64>>;

    /// Perform exactly one gradient update pulling `predict(state)` toward
    /// `target`. Returns the loss measured before the update.
    fn fit_step(&mut self, state: &[f64], target: &[f64]) -> Result<f64>;

    /// Replace all parameters with a fresh set sized for `action_count` outputs.
    ///
    /// All prior value estimates are lost.
    fn rebuild(&mut self, action_count: usize) -> Result<()>;

    /// Widen the output to `action_count` keeping what was already learned.
    ///
    /// The default falls back to [`ValueApproximator::rebuild`] for models
    /// that cannot be widened in place.
    fn expand(&mut self, action_count: usize) -> Result<()> {
        ensure_no_shrink(self.action_count(), action_count)?;
        self.rebuild(action_count)
    }

    /// Grow to `action_count` outputs using `strategy`.
    fn grow(&mut self, action_count: usize, strategy: GrowthStrategy) -> Result<()> {
        match strategy {
            GrowthStrategy::Rebuild => self.rebuild(action_count),
            GrowthStrategy::PreserveWeights => self.expand(action_count),
        }
    }
}

pub(crate) fn ensure_state_size(expected: usize, state: &[f64]) -> Result<()> {
    if state.len() != expected {
        return Err(Error::StateSizeMismatch {
            expected,
            got: state.len(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_target_size(expected: usize, target: &[f64]) -> Result<()> {
    if target.len() != expected {
        return Err(Error::TargetSizeMismatch {
            expected,
            got: target.len(),
        });
    }
    Ok(())
}

pub(crate) fn ensure_no_shrink(current: usize, requested: usize) -> Result<()> {
    if requested == 0 {
        return Err(Error::EmptyActionSpace);
    }
    if requested < current {
        return Err(Error::ActionSpaceShrink { current, requested });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_growth_strategy() {
        assert_eq!(
            "preserve".parse::<GrowthStrategy>().unwrap(),
            GrowthStrategy::PreserveWeights
        );
        assert_eq!(
            "REBUILD".parse::<GrowthStrategy>().unwrap(),
            GrowthStrategy::Rebuild
        );
        assert!("transplant".parse::<GrowthStrategy>().is_err());
    }

    #[test]
    fn test_shrink_guard() {
        assert!(ensure_no_shrink(3, 3).is_ok());
        assert!(ensure_no_shrink(3, 5).is_ok());
        assert!(matches!(
            ensure_no_shrink(3, 2),
            Err(Error::ActionSpaceShrink {
                current: 3,
                requested: 2
            })
        ));
        assert!(matches!(ensure_no_shrink(0, 0), Err(Error::EmptyActionSpace)));
    }
}
