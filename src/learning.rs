//! Q-learning target construction
//!
//! A single-transition TD(0) update:
//!
//! ```text
//! target    = Q(s, ·)                       (copy)
//! target[a] = r + γ · max_a' Q(s', a')      (r alone when s' is terminal)
//! fit_step(s, target)
//! ```
//!
//! Only the entry of the taken action moves; every other entry is pre-seeded
//! with the current prediction so its error is zero.

use serde::{Deserialize, Serialize};

use crate::{
    approximator::ValueApproximator,
    error::{Error, Result},
    policy::max_value,
};

/// Result of one learning step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TdStep {
    /// Output index that was updated
    pub action: usize,
    /// Q(s, a) before the update
    pub previous: f64,
    /// Value the entry was pulled toward
    pub target: f64,
    /// Approximator loss before the update
    pub loss: f64,
}

impl TdStep {
    pub fn td_error(&self) -> f64 {
        self.target - self.previous
    }
}

/// Discounted one-step bootstrap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TdUpdate {
    gamma: f64,
}

impl TdUpdate {
    pub fn new(gamma: f64) -> Result<Self> {
        if !(0.0..1.0).contains(&gamma) {
            return Err(Error::invalid_config(format!(
                "discount factor {gamma} must lie in [0, 1)"
            )));
        }
        Ok(Self { gamma })
    }

    pub fn gamma(&self) -> f64 {
        self.gamma
    }

    /// `r + γ · max(next_values)`, or `r` when there is no successor.
    pub fn bootstrap(&self, reward: f64, next_values: Option<&[f64]>) -> f64 {
        match next_values {
            Some(values) if !values.is_empty() => reward + self.gamma * max_value(values),
            _ => reward,
        }
    }

    /// Q-learning update for the transition `(state, action, reward, next_state)`.
    ///
    /// `next_state` of `None` marks a terminal transition.
    pub fn apply<A: ValueApproximator + ?Sized>(
        &self,
        approximator: &mut A,
        state: &[f64],
        action: usize,
        reward: f64,
        next_state: Option<&[f64]>,
    ) -> Result<TdStep> {
        let current = approximator.predict(state)?;
        let next_values = next_state
            .map(|next| approximator.predict(next))
            .transpose()?;
        let value = self.bootstrap(reward, next_values.as_deref());
        fit_entry(approximator, state, current, action, value)
    }
}

/// Pull only entry `action` of `Q(state, ·)` toward `value`.
pub fn set_entry<A: ValueApproximator + ?Sized>(
    approximator: &mut A,
    state: &[f64],
    action: usize,
    value: f64,
) -> Result<TdStep> {
    let current = approximator.predict(state)?;
    fit_entry(approximator, state, current, action, value)
}

/// Regress `Q(state, ·)` toward the one-hot vector for `action`.
pub fn fit_one_hot<A: ValueApproximator + ?Sized>(
    approximator: &mut A,
    state: &[f64],
    action: usize,
) -> Result<TdStep> {
    let current = approximator.predict(state)?;
    let previous = entry(&current, action)?;
    let target = one_hot(current.len(), action)?;
    let loss = approximator.fit_step(state, &target)?;
    Ok(TdStep {
        action,
        previous,
        target: 1.0,
        loss,
    })
}

/// Copy of `current` with entry `action` replaced by `value`.
pub fn target_vector(current: &[f64], action: usize, value: f64) -> Result<Vec<f64>> {
    entry(current, action)?;
    let mut target = current.to_vec();
    target[action] = value;
    Ok(target)
}

/// Vector of `len` zeros with a 1.0 at `index`.
pub fn one_hot(len: usize, index: usize) -> Result<Vec<f64>> {
    let mut vector = vec![0.0; len];
    *vector
        .get_mut(index)
        .ok_or(Error::UnknownActionIndex { index, count: len })? = 1.0;
    Ok(vector)
}

fn entry(values: &[f64], action: usize) -> Result<f64> {
    values
        .get(action)
        .copied()
        .ok_or(Error::UnknownActionIndex {
            index: action,
            count: values.len(),
        })
}

fn fit_entry<A: ValueApproximator + ?Sized>(
    approximator: &mut A,
    state: &[f64],
    current: Vec<f64>,
    action: usize,
    value: f64,
) -> Result<TdStep> {
    let previous = entry(&current, action)?;
    let target = target_vector(&current, action, value)?;
    let loss = approximator.fit_step(state, &target)?;
    Ok(TdStep {
        action,
        previous,
        target: value,
        loss,
    })
}
