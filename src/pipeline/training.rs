//! Training pipeline for agents and chatbots

use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    agent::Agent,
    approximator::ValueApproximator,
    chatbot::{Chatbot, TeachOutcome},
    ports::{EpisodeSummary, Environment, Observer},
};

/// Training configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Number of training episodes
    pub episodes: usize,

    /// Episodes between periodic reports (0 = never)
    pub report_every: usize,
}

impl TrainingConfig {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            ..Self::default()
        }
    }

    pub fn with_report_every(mut self, report_every: usize) -> Self {
        self.report_every = report_every;
        self
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            episodes: 200,
            report_every: 20,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingResult {
    /// Episodes run
    pub episodes: usize,

    /// Agent decisions across all episodes
    pub steps: usize,

    /// Successful decisions across all episodes
    pub successes: usize,

    /// Steps taken in each episode
    pub episode_steps: Vec<usize>,

    /// Accuracy of the last episode
    pub final_accuracy: f64,

    /// Exploration rate after training
    pub final_epsilon: f64,
}

impl TrainingResult {
    fn from_summaries(summaries: &[EpisodeSummary], final_epsilon: f64) -> Self {
        Self {
            episodes: summaries.len(),
            steps: summaries.iter().map(|s| s.steps).sum(),
            successes: summaries.iter().map(|s| s.successes).sum(),
            episode_steps: summaries.iter().map(|s| s.steps).collect(),
            final_accuracy: summaries.last().map_or(0.0, EpisodeSummary::accuracy),
            final_epsilon,
        }
    }

    /// Fraction of successful decisions over the whole run
    pub fn accuracy(&self) -> f64 {
        if self.steps == 0 {
            0.0
        } else {
            self.successes as f64 / self.steps as f64
        }
    }

    /// Save result to JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Training pipeline feeding episode summaries to observers
pub struct TrainingPipeline {
    config: TrainingConfig,
    observers: Vec<Box<dyn Observer>>,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    /// Add an observer to the pipeline
    pub fn with_observer(mut self, observer: Box<dyn Observer>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run `agent` against `env` for the configured number of episodes.
    ///
    /// Each step is the episode driver protocol: select, apply, learn.
    /// Terminal transitions learn from the reward alone.
    pub fn run_environment<A, R, E>(
        &mut self,
        agent: &mut Agent<A, R>,
        env: &mut E,
    ) -> Result<TrainingResult>
    where
        A: ValueApproximator,
        R: Rng,
        E: Environment + ?Sized,
    {
        let summaries = self.run(|episode| run_episode(agent, env, episode))?;
        Ok(TrainingResult::from_summaries(&summaries, agent.epsilon()))
    }

    /// Train `chatbot` with one corpus pass per episode.
    pub fn run_chatbot<A, R>(&mut self, chatbot: &mut Chatbot<A, R>) -> Result<TrainingResult>
    where
        A: ValueApproximator,
        R: Rng,
    {
        let summaries = self.run(|number| {
            chatbot.train_episode().map(|summary| EpisodeSummary {
                episode: number,
                ..summary
            })
        })?;
        Ok(TrainingResult::from_summaries(&summaries, chatbot.agent().epsilon()))
    }

    /// Teach `chatbot` one pair, reporting growth to the observers.
    pub fn teach<A, R>(
        &mut self,
        chatbot: &mut Chatbot<A, R>,
        question: &str,
        answer: &str,
    ) -> Result<TeachOutcome>
    where
        A: ValueApproximator,
        R: Rng,
    {
        let outcome = chatbot.teach(question, answer)?;
        if let TeachOutcome::Grew(event) = &outcome {
            for observer in &mut self.observers {
                observer.on_growth(event)?;
            }
        }
        Ok(outcome)
    }

    fn run<F>(&mut self, mut episode: F) -> Result<Vec<EpisodeSummary>>
    where
        F: FnMut(usize) -> Result<EpisodeSummary>,
    {
        let total = self.config.episodes;
        for observer in &mut self.observers {
            observer.on_training_start(total)?;
        }

        let mut summaries = Vec::with_capacity(total);
        for number in 1..=total {
            let summary = episode(number)?;
            for observer in &mut self.observers {
                observer.on_episode_end(&summary)?;
            }
            summaries.push(summary);
        }

        for observer in &mut self.observers {
            observer.on_training_end()?;
        }
        Ok(summaries)
    }
}

fn run_episode<A, R, E>(agent: &mut Agent<A, R>, env: &mut E, episode: usize) -> Result<EpisodeSummary>
where
    A: ValueApproximator,
    R: Rng,
    E: Environment + ?Sized,
{
    let mut state = env.reset();
    let mut steps = 0;
    let mut successes = 0;
    let mut total_reward = 0.0;

    loop {
        let action = agent.select_action(&state)?;
        let step = env.step(action)?;
        if step.terminal {
            agent.learn_terminal(&state, action, step.reward)?;
        } else {
            agent.learn(&state, action, step.reward, &step.next_state)?;
        }

        steps += 1;
        total_reward += step.reward;
        if step.success {
            successes += 1;
        }
        if step.done {
            break;
        }
        state = env.state();
    }

    Ok(EpisodeSummary {
        episode,
        steps,
        successes,
        total_reward,
        epsilon: agent.epsilon(),
    })
}
