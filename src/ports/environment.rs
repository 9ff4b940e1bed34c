//! Environment port - the episode loop's view of a task

use crate::{Result, encoding::StateVector};

/// Outcome of applying one action.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// Successor state the TD target bootstraps from
    pub next_state: StateVector,
    pub reward: f64,
    /// The successor is absorbing; learn from the reward alone
    pub terminal: bool,
    /// The episode is over (terminal, or cut short by the environment)
    pub done: bool,
    /// Whether this step met the task's success criterion
    pub success: bool,
}

/// Discrete-action task driven by an external episode loop.
pub trait Environment {
    /// Number of actions the agent chooses among.
    fn action_count(&self) -> usize;

    /// Length of the state vectors this environment emits.
    fn state_size(&self) -> usize;

    /// Start a new episode and return its first state.
    fn reset(&mut self) -> StateVector;

    /// State the agent acts from next.
    ///
    /// Usually the last step's `next_state`; environments that chain
    /// independent sequences may jump elsewhere.
    fn state(&self) -> StateVector;

    /// Apply `action` to the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownActionIndex`] for an action outside
    /// `0..action_count()`.
    fn step(&mut self, action: usize) -> Result<Step>;
}
