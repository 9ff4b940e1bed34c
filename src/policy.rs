//! Epsilon-greedy action selection with multiplicative decay

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Index of the first maximum in `values`.
///
/// Ties resolve to the lowest index; NaN entries never win. Returns `None`
/// for an empty slice.
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (index, &value) in values.iter().enumerate() {
        if value.is_nan() {
            continue;
        }
        if best.is_none_or(|(_, top)| value > top) {
            best = Some((index, value));
        }
    }
    best.map(|(index, _)| index).or_else(|| (!values.is_empty()).then_some(0))
}

/// Largest value in `values`, `NEG_INFINITY` when empty.
pub fn max_value(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Outcome of one policy decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    pub action: usize,
    /// Whether the action came from the exploration branch
    pub explored: bool,
}

/// ε-greedy policy state.
///
/// `epsilon` only changes through [`EpsilonGreedy::decay`] (multiplicative,
/// never below `min_epsilon`) or through the explicit overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpsilonGreedy {
    epsilon: f64,
    initial_epsilon: f64,
    decay_rate: f64,
    min_epsilon: f64,
}

impl EpsilonGreedy {
    /// Create a policy starting at `epsilon` and decaying by `decay_rate`.
    pub fn new(epsilon: f64, decay_rate: f64) -> Result<Self> {
        Self::with_floor(epsilon, decay_rate, 0.0)
    }

    /// Like [`EpsilonGreedy::new`] with a lower bound on epsilon.
    pub fn with_floor(epsilon: f64, decay_rate: f64, min_epsilon: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&epsilon) {
            return Err(Error::invalid_config(format!(
                "epsilon {epsilon} must lie in [0, 1]"
            )));
        }
        if !(decay_rate > 0.0 && decay_rate < 1.0) {
            return Err(Error::invalid_config(format!(
                "epsilon decay {decay_rate} must lie in (0, 1)"
            )));
        }
        if !(0.0..=epsilon).contains(&min_epsilon) {
            return Err(Error::invalid_config(format!(
                "minimum epsilon {min_epsilon} must lie in [0, {epsilon}]"
            )));
        }
        Ok(Self {
            epsilon,
            initial_epsilon: epsilon,
            decay_rate,
            min_epsilon,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    /// Choose among `action_count` actions.
    ///
    /// With probability epsilon a uniformly random action is returned;
    /// otherwise `greedy` is consulted. `greedy` is not called on the
    /// exploration branch.
    pub fn select<R, F>(&self, action_count: usize, rng: &mut R, greedy: F) -> Result<Decision>
    where
        R: Rng,
        F: FnOnce() -> Result<usize>,
    {
        if action_count == 0 {
            return Err(Error::EmptyActionSpace);
        }
        if rng.random::<f64>() < self.epsilon {
            Ok(Decision {
                action: rng.random_range(0..action_count),
                explored: true,
            })
        } else {
            Ok(Decision {
                action: greedy()?,
                explored: false,
            })
        }
    }

    /// `epsilon ← max(epsilon × decay_rate, min_epsilon)`
    pub fn decay(&mut self) {
        self.epsilon = (self.epsilon * self.decay_rate).max(self.min_epsilon);
    }

    /// Force fully greedy behavior
    pub fn disable_exploration(&mut self) {
        self.epsilon = 0.0;
    }

    /// Restore full exploration (epsilon = 1)
    pub fn reset_epsilon(&mut self) {
        self.epsilon = 1.0;
    }

    /// Restore the epsilon the policy was created with
    pub fn restore_initial(&mut self) {
        self.epsilon = self.initial_epsilon;
    }

    /// Override epsilon, clamped into `[0, 1]`
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.epsilon = epsilon.clamp(0.0, 1.0);
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;

    #[test]
    fn test_argmax_tie_breaks_low() {
        assert_eq!(argmax(&[5.0, 5.0, 3.0]), Some(0));
        assert_eq!(argmax(&[1.0, 7.0, 7.0]), Some(1));
        assert_eq!(argmax(&[-2.0, -1.0]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_argmax_skips_nan() {
        assert_eq!(argmax(&[f64::NAN, 2.0, 1.0]), Some(1));
        assert_eq!(argmax(&[1.0, f64::NAN, 3.0]), Some(2));
        assert_eq!(argmax(&[f64::NAN]), Some(0));
    }

    #[test]
    fn test_max_value() {
        assert_eq!(max_value(&[1.0, 4.0, -2.0]), 4.0);
        assert_eq!(max_value(&[]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_decay_is_multiplicative() {
        let mut policy = EpsilonGreedy::new(1.0, 0.5).unwrap();
        policy.decay();
        assert_eq!(policy.epsilon(), 0.5);
        policy.decay();
        assert_eq!(policy.epsilon(), 0.25);
    }

    #[test]
    fn test_floor_is_respected() {
        let mut policy = EpsilonGreedy::with_floor(0.2, 0.5, 0.1).unwrap();
        for _ in 0..10 {
            policy.decay();
        }
        assert_eq!(policy.epsilon(), 0.1);
    }

    #[test]
    fn test_overrides() {
        let mut policy = EpsilonGreedy::new(0.6, 0.9).unwrap();
        policy.disable_exploration();
        assert_eq!(policy.epsilon(), 0.0);
        policy.reset_epsilon();
        assert_eq!(policy.epsilon(), 1.0);
        policy.set_epsilon(3.0);
        assert_eq!(policy.epsilon(), 1.0);
        policy.restore_initial();
        assert_eq!(policy.epsilon(), 0.6);
    }

    #[test]
    fn test_invalid_parameters() {
        assert!(EpsilonGreedy::new(1.5, 0.9).is_err());
        assert!(EpsilonGreedy::new(0.5, 1.0).is_err());
        assert!(EpsilonGreedy::new(0.5, 0.0).is_err());
        assert!(EpsilonGreedy::with_floor(0.5, 0.9, 0.6).is_err());
    }

    #[test]
    fn test_zero_epsilon_always_exploits() {
        let policy = EpsilonGreedy::new(0.0, 0.9).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..100 {
            let decision = policy.select(4, &mut rng, || Ok(2)).unwrap();
            assert_eq!(decision, Decision { action: 2, explored: false });
        }
    }

    #[test]
    fn test_full_epsilon_always_explores_in_range() {
        let policy = EpsilonGreedy::new(1.0, 0.9).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let mut seen = [false; 3];
        for _ in 0..200 {
            let decision = policy
                .select(3, &mut rng, || panic!("greedy branch taken"))
                .unwrap();
            assert!(decision.explored);
            seen[decision.action] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_empty_action_space() {
        let policy = EpsilonGreedy::new(0.0, 0.9).unwrap();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            policy.select(0, &mut rng, || Ok(0)),
            Err(Error::EmptyActionSpace)
        ));
    }
}
