//! Online Q-learning agent
//!
//! The agent composes a [`ValueApproximator`], an [`EpsilonGreedy`] policy and
//! a [`TdUpdate`] behind the episode driver API:
//!
//! - [`Agent::select_action`] picks an action for a state vector
//! - [`Agent::learn`] applies one Q-learning step and decays epsilon
//! - [`Agent::disable_exploration`] / [`Agent::reset_epsilon`] switch between
//!   evaluation and training behavior
//!
//! The random source is injected so callers can make branch selection exact.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    app::AgentConfig,
    approximator::{GrowthStrategy, Mlp, ValueApproximator, ensure_no_shrink},
    error::{Error, Result},
    learning::{self, TdStep, TdUpdate},
    policy::{Decision, EpsilonGreedy, argmax},
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct AgentState<A> {
    pub approximator: A,
    pub policy: EpsilonGreedy,
    pub update: TdUpdate,
    pub rng_seed: Option<u64>,
}

pub(crate) fn build_rng(seed: Option<u64>) -> StdRng {
    if let Some(seed) = seed {
        StdRng::seed_from_u64(seed)
    } else {
        StdRng::from_rng(&mut rand::rng())
    }
}

/// Q-learning agent over a function approximator
#[derive(Debug, Clone)]
pub struct Agent<A = Mlp, R = StdRng> {
    approximator: A,
    policy: EpsilonGreedy,
    update: TdUpdate,
    rng: R,
    rng_seed: Option<u64>,
}

impl<A: ValueApproximator> Agent<A, StdRng> {
    /// Create an agent seeded from `config.seed` (or the thread RNG).
    pub fn new(approximator: A, config: &AgentConfig) -> Result<Self> {
        let mut agent = Self::with_rng(approximator, config, build_rng(config.seed))?;
        agent.rng_seed = config.seed;
        Ok(agent)
    }

    pub(crate) fn export_state(&self) -> AgentState<A>
    where
        A: Clone,
    {
        AgentState {
            approximator: self.approximator.clone(),
            policy: self.policy.clone(),
            update: self.update,
            rng_seed: self.rng_seed,
        }
    }

    pub(crate) fn from_state(state: AgentState<A>) -> Self {
        Self {
            approximator: state.approximator,
            policy: state.policy,
            update: state.update,
            rng: build_rng(state.rng_seed),
            rng_seed: state.rng_seed,
        }
    }
}

impl<A: ValueApproximator, R: Rng> Agent<A, R> {
    /// Create an agent drawing its exploration decisions from `rng`.
    pub fn with_rng(approximator: A, config: &AgentConfig, rng: R) -> Result<Self> {
        config.validate()?;
        if approximator.action_count() == 0 {
            return Err(Error::EmptyActionSpace);
        }
        Ok(Self {
            approximator,
            policy: config.policy()?,
            update: config.td_update()?,
            rng,
            rng_seed: None,
        })
    }

    pub fn approximator(&self) -> &A {
        &self.approximator
    }

    pub fn state_size(&self) -> usize {
        self.approximator.state_size()
    }

    pub fn action_count(&self) -> usize {
        self.approximator.action_count()
    }

    pub fn gamma(&self) -> f64 {
        self.update.gamma()
    }

    pub fn epsilon(&self) -> f64 {
        self.policy.epsilon()
    }

    /// Override the exploration rate, clamped into `[0, 1]`.
    pub fn set_epsilon(&mut self, epsilon: f64) {
        self.policy.set_epsilon(epsilon);
    }

    /// Force `epsilon = 0` for deterministic evaluation.
    pub fn disable_exploration(&mut self) {
        self.policy.disable_exploration();
    }

    /// Restore `epsilon = 1`.
    pub fn reset_epsilon(&mut self) {
        self.policy.reset_epsilon();
    }

    /// Current Q-values of `state`.
    pub fn q_values(&self, state: &[f64]) -> Result<Vec<f64>> {
        self.approximator.predict(state)
    }

    /// First maximum of `Q(state, ·)`.
    pub fn greedy_action(&self, state: &[f64]) -> Result<usize> {
        greedy(&self.approximator, state)
    }

    /// ε-greedy selection over all currently registered actions.
    pub fn select_action(&mut self, state: &[f64]) -> Result<usize> {
        self.decide(state).map(|decision| decision.action)
    }

    /// Like [`Agent::select_action`], also reporting which branch was taken.
    pub fn decide(&mut self, state: &[f64]) -> Result<Decision> {
        let approximator = &self.approximator;
        self.policy
            .select(approximator.action_count(), &mut self.rng, || {
                greedy(approximator, state)
            })
    }

    /// Q-learning step for a non-terminal transition.
    pub fn learn(
        &mut self,
        state: &[f64],
        action: usize,
        reward: f64,
        next_state: &[f64],
    ) -> Result<TdStep> {
        self.learn_transition(state, action, reward, Some(next_state))
    }

    /// Q-learning step for a transition into a terminal state.
    pub fn learn_terminal(&mut self, state: &[f64], action: usize, reward: f64) -> Result<TdStep> {
        self.learn_transition(state, action, reward, None)
    }

    fn learn_transition(
        &mut self,
        state: &[f64],
        action: usize,
        reward: f64,
        next_state: Option<&[f64]>,
    ) -> Result<TdStep> {
        let step = self
            .update
            .apply(&mut self.approximator, state, action, reward, next_state)?;
        self.policy.decay();
        Ok(step)
    }

    /// Pull only `Q(state, action)` toward `value`.
    pub fn learn_toward(&mut self, state: &[f64], action: usize, value: f64) -> Result<TdStep> {
        let step = learning::set_entry(&mut self.approximator, state, action, value)?;
        self.policy.decay();
        Ok(step)
    }

    /// Regress `Q(state, ·)` toward the one-hot vector of `action`.
    pub fn learn_one_hot(&mut self, state: &[f64], action: usize) -> Result<TdStep> {
        let step = learning::fit_one_hot(&mut self.approximator, state, action)?;
        self.policy.decay();
        Ok(step)
    }

    /// Widen the approximator to `action_count` outputs.
    ///
    /// Growing to the current width is a no-op; shrinking is rejected.
    pub fn grow(&mut self, action_count: usize, strategy: GrowthStrategy) -> Result<()> {
        let current = self.action_count();
        ensure_no_shrink(current, action_count)?;
        if action_count == current {
            return Ok(());
        }
        debug!(current, action_count, %strategy, "Growing approximator");
        self.approximator.grow(action_count, strategy)
    }
}

fn greedy<A: ValueApproximator + ?Sized>(approximator: &A, state: &[f64]) -> Result<usize> {
    let values = approximator.predict(state)?;
    argmax(&values).ok_or(Error::EmptyActionSpace)
}
