//! Common test utilities for the qlearn test suite.
//!
//! This module provides a constant random source, a fixed-output approximator
//! and small corpora shared across the integration tests.

#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use qlearn::{
    Error, Result, TrainingCorpus, ValueApproximator,
    ports::{EpisodeSummary, GrowthEvent, Observer},
};
use rand::RngCore;

/// Random source that always yields the same word.
///
/// `FixedRng(0)` makes every uniform draw 0.0 (explore whenever epsilon > 0,
/// and the random action is always 0). `FixedRng(u64::MAX)` makes every draw
/// just below 1.0 (exploit whenever epsilon < 1). `FixedRng::midpoint()`
/// draws exactly 0.5.
#[derive(Debug, Clone, Copy)]
pub struct FixedRng(pub u64);

impl FixedRng {
    pub fn explore() -> Self {
        Self(0)
    }

    pub fn exploit() -> Self {
        Self(u64::MAX)
    }

    pub fn midpoint() -> Self {
        Self(1 << 63)
    }
}

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        self.0 as u32
    }

    fn next_u64(&mut self) -> u64 {
        self.0
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        dst.fill(self.0 as u8);
    }
}

/// Approximator returning the same Q-values for every state.
///
/// Counts fit steps so tests can tell whether learning happened, and
/// predictions so they can tell the greedy branch from the random one.
#[derive(Debug, Clone)]
pub struct StubApproximator {
    pub state_size: usize,
    pub values: Vec<f64>,
    pub fit_calls: usize,
    pub predict_calls: Arc<AtomicUsize>,
    /// Fit steps allowed before every further one fails
    pub fit_limit: Option<usize>,
}

impl StubApproximator {
    pub fn new(state_size: usize, values: Vec<f64>) -> Self {
        Self {
            state_size,
            values,
            fit_calls: 0,
            predict_calls: Arc::new(AtomicUsize::new(0)),
            fit_limit: None,
        }
    }

    pub fn failing_after(mut self, fits: usize) -> Self {
        self.fit_limit = Some(fits);
        self
    }

    pub fn predictions(&self) -> usize {
        self.predict_calls.load(Ordering::SeqCst)
    }
}

impl ValueApproximator for StubApproximator {
    fn state_size(&self) -> usize {
        self.state_size
    }

    fn action_count(&self) -> usize {
        self.values.len()
    }

    fn predict(&self, _state: &[f64]) -> Result<Vec<f64>> {
        self.predict_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.values.clone())
    }

    fn fit_step(&mut self, _state: &[f64], _target: &[f64]) -> Result<f64> {
        if self.fit_limit.is_some_and(|limit| self.fit_calls >= limit) {
            return Err(Error::InvalidConfiguration {
                message: "stub fit limit reached".to_string(),
            });
        }
        self.fit_calls += 1;
        Ok(0.0)
    }

    fn rebuild(&mut self, action_count: usize) -> Result<()> {
        self.values = vec![0.0; action_count];
        Ok(())
    }
}

/// Three pairs whose questions share no letters.
pub fn disjoint_corpus() -> TrainingCorpus {
    TrainingCorpus::from_pairs([
        ("hola", "buenas tardes"),
        ("venus", "un planeta"),
        ("trick", "un truco"),
    ])
}

/// Observer recording every callback into shared storage.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    pub started: Arc<Mutex<Option<usize>>>,
    pub episodes: Arc<Mutex<Vec<EpisodeSummary>>>,
    pub growth: Arc<Mutex<Vec<GrowthEvent>>>,
    pub ended: Arc<Mutex<bool>>,
}

impl Observer for RecordingObserver {
    fn on_training_start(&mut self, total_episodes: usize) -> Result<()> {
        *self.started.lock().unwrap() = Some(total_episodes);
        Ok(())
    }

    fn on_episode_end(&mut self, summary: &EpisodeSummary) -> Result<()> {
        self.episodes.lock().unwrap().push(summary.clone());
        Ok(())
    }

    fn on_growth(&mut self, event: &GrowthEvent) -> Result<()> {
        self.growth.lock().unwrap().push(event.clone());
        Ok(())
    }

    fn on_training_end(&mut self) -> Result<()> {
        *self.ended.lock().unwrap() = true;
        Ok(())
    }
}
