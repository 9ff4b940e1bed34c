//! Response-selection chatbot
//!
//! A chatbot treats each distinct answer in its corpus as one action. The
//! question text is encoded into a state vector, the agent picks an answer
//! index, and the overlap between the chosen and the expected answer drives
//! learning.
//!
//! ## Growth protocol
//!
//! Teaching a pair whose answer is not registered yet:
//!
//! 1. registers the answer, widening the action space by one
//! 2. grows the approximator (rebuild by default)
//! 3. replays every other known pair `replay_passes` times at
//!    `replay_epsilon`, restoring epsilon afterwards
//! 4. imprints the new pair `imprint_passes` times
//!
//! This costs O(corpus size × replay passes) fit steps per new answer, which
//! is fine for corpora of tens of answers and nothing larger.

mod snapshot;

pub use snapshot::SavedChatbot;

use rand::{Rng, rngs::StdRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    agent::Agent,
    app::{AgentConfig, ChatConfig, ChatLearning, UnknownLabelPolicy},
    approximator::{Mlp, NetworkConfig, ValueApproximator},
    corpus::{QaPair, TrainingCorpus, normalize},
    encoding::{StateEncoder, StateVector},
    error::{Error, Result},
    ports::{EpisodeSummary, GrowthEvent},
    registry::ActionRegistry,
};

/// Cumulative training statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingStats {
    pub episodes: usize,
    pub attempts: usize,
    pub hits: usize,
    pub total_reward: f64,
}

impl TrainingStats {
    fn record(&mut self, reward: f64, hit: bool) {
        self.attempts += 1;
        self.total_reward += reward;
        if hit {
            self.hits += 1;
        }
    }

    /// Fraction of attempts that were hits.
    pub fn accuracy(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.hits as f64 / self.attempts as f64
        }
    }
}

/// Greedy answers compared against the corpus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    pub correct: usize,
    pub total: usize,
    /// `(question, expected, replied)` for every wrong reply
    pub mistakes: Vec<(String, String, String)>,
}

impl Evaluation {
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// What [`Chatbot::teach`] did with a pair.
#[derive(Debug, Clone, PartialEq)]
pub enum TeachOutcome {
    /// The answer was new: the action space grew and known pairs were replayed.
    Grew(GrowthEvent),
    /// The answer was already registered and the pair was reinforced.
    Reinforced { index: usize },
}

/// Chatbot over an [`Agent`], an [`ActionRegistry`] of answers and a corpus
#[derive(Debug, Clone)]
pub struct Chatbot<A = Mlp, R = StdRng> {
    agent: Agent<A, R>,
    registry: ActionRegistry,
    corpus: TrainingCorpus,
    config: ChatConfig,
    stats: TrainingStats,
}

impl Chatbot {
    /// Build a chatbot whose actions are the corpus answers in first-seen order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyCorpus`] for an empty corpus, or a configuration
    /// error from any of the configs.
    pub fn new(
        corpus: TrainingCorpus,
        config: ChatConfig,
        agent_config: &AgentConfig,
        network: NetworkConfig,
    ) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        config.validate()?;
        let registry: ActionRegistry = corpus.distinct_answers().into_iter().collect();
        let approximator = Mlp::new(config.encoding.state_size(), registry.count(), network)?;
        let agent = Agent::new(approximator, agent_config)?;
        info!(
            pairs = corpus.len(),
            actions = registry.count(),
            learning = %config.learning,
            encoding = %config.encoding,
            "Chatbot created"
        );
        Self::assemble(agent, registry, corpus, config)
    }
}

impl<A: ValueApproximator, R: Rng> Chatbot<A, R> {
    /// Build a chatbot around an existing agent.
    ///
    /// The agent's output width must equal the number of distinct answers.
    pub fn from_parts(agent: Agent<A, R>, corpus: TrainingCorpus, config: ChatConfig) -> Result<Self> {
        if corpus.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        config.validate()?;
        let registry = corpus.distinct_answers().into_iter().collect();
        Self::assemble(agent, registry, corpus, config)
    }

    fn assemble(
        agent: Agent<A, R>,
        registry: ActionRegistry,
        corpus: TrainingCorpus,
        config: ChatConfig,
    ) -> Result<Self> {
        if registry.count() != agent.action_count() {
            return Err(Error::ActionCountMismatch {
                registry: registry.count(),
                approximator: agent.action_count(),
            });
        }
        if config.encoding.state_size() != agent.state_size() {
            return Err(Error::StateSizeMismatch {
                expected: agent.state_size(),
                got: config.encoding.state_size(),
            });
        }
        Ok(Self {
            agent,
            registry,
            corpus,
            config,
            stats: TrainingStats::default(),
        })
    }

    pub fn agent(&self) -> &Agent<A, R> {
        &self.agent
    }

    pub fn agent_mut(&mut self) -> &mut Agent<A, R> {
        &mut self.agent
    }

    pub fn registry(&self) -> &ActionRegistry {
        &self.registry
    }

    pub fn corpus(&self) -> &TrainingCorpus {
        &self.corpus
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    pub fn stats(&self) -> &TrainingStats {
        &self.stats
    }

    pub fn encode(&self, text: &str) -> StateVector {
        self.config.encoding.encode(text)
    }

    /// ε-greedy answer for `question`.
    pub fn select_response(&mut self, question: &str) -> Result<String> {
        let state = self.encode(question);
        let index = self.agent.select_action(&state)?;
        Ok(self.registry.label_of(index)?.to_string())
    }

    /// Greedy answer for `question`.
    pub fn reply(&self, question: &str) -> Result<String> {
        let state = self.encode(question);
        let index = self.agent.greedy_action(&state)?;
        Ok(self.registry.label_of(index)?.to_string())
    }

    /// Learn from one exchange and return the reward it earned.
    pub fn learn(&mut self, question: &str, generated: &str, expected: &str) -> Result<f64> {
        let reward = self.fit(question, generated, expected)?;
        self.stats.record(reward, reward > self.config.hit_threshold);
        Ok(reward)
    }

    fn fit(&mut self, question: &str, generated: &str, expected: &str) -> Result<f64> {
        let expected = normalize(expected);
        let index = self.expected_index(&expected)?;
        let state = self.encode(question);

        match self.config.learning {
            ChatLearning::Bootstrap => {
                let reward = self.config.reward.score(generated, &expected);
                let successor = self.encode(&expected);
                self.agent.learn(&state, index, reward, &successor)?;
                Ok(reward)
            }
            ChatLearning::Classification => {
                // Scored against the greedy pick, not the sampled reply.
                let predicted = self.agent.greedy_action(&state)?;
                let signal = self.config.classification_reward.score(predicted, index);
                self.agent.learn_toward(&state, index, signal)?;
                Ok(signal)
            }
            ChatLearning::Supervised => {
                let reward = self.config.reward.score(generated, &expected);
                self.agent.learn_one_hot(&state, index)?;
                Ok(reward)
            }
        }
    }

    fn expected_index(&self, expected: &str) -> Result<usize> {
        match self.registry.index_of(expected) {
            Ok(index) => Ok(index),
            Err(err) => match self.config.unknown_label {
                UnknownLabelPolicy::Reject => Err(err),
                UnknownLabelPolicy::FallbackToFirst => {
                    warn!(label = expected, "Expected answer not registered, training index 0");
                    Ok(0)
                }
            },
        }
    }

    /// Select and learn once for `question`, outside the statistics.
    fn rehearse(&mut self, question: &str, expected: &str) -> Result<f64> {
        let generated = self.select_response(question)?;
        self.fit(question, &generated, expected)
    }

    /// One pass over the whole corpus.
    pub fn train_episode(&mut self) -> Result<EpisodeSummary> {
        let pairs: Vec<QaPair> = self.corpus.pairs().to_vec();
        let mut successes = 0;
        let mut total_reward = 0.0;
        for pair in &pairs {
            let generated = self.select_response(&pair.question)?;
            let reward = self.learn(&pair.question, &generated, &pair.answer)?;
            total_reward += reward;
            if reward > self.config.hit_threshold {
                successes += 1;
            }
        }
        self.stats.episodes += 1;
        Ok(EpisodeSummary {
            episode: self.stats.episodes,
            steps: pairs.len(),
            successes,
            total_reward,
            epsilon: self.agent.epsilon(),
        })
    }

    /// Greedy accuracy over the corpus. Does not learn.
    pub fn evaluate(&self) -> Result<Evaluation> {
        let mut evaluation = Evaluation::default();
        for pair in self.corpus.iter() {
            let replied = self.reply(&pair.question)?;
            evaluation.total += 1;
            if replied == pair.answer {
                evaluation.correct += 1;
            } else {
                evaluation
                    .mistakes
                    .push((pair.question.clone(), pair.answer.clone(), replied));
            }
        }
        Ok(evaluation)
    }

    /// Add `question → answer` to the corpus and learn it.
    ///
    /// A new answer triggers the growth protocol; a known one is reinforced
    /// `known_answer_passes` times. Both paths then imprint the pair
    /// `imprint_passes` times.
    pub fn teach(&mut self, question: &str, answer: &str) -> Result<TeachOutcome> {
        let question = normalize(question);
        let answer = normalize(answer);
        let growth = self.config.growth.clone();
        self.corpus.insert(&question, &answer);

        let outcome = if let Ok(index) = self.registry.index_of(&answer) {
            debug!(question = %question, index, "Reinforcing pair with known answer");
            for _ in 0..growth.known_answer_passes {
                self.rehearse(&question, &answer)?;
            }
            TeachOutcome::Reinforced { index }
        } else {
            self.registry.register_if_absent(&answer);
            let action_count = self.registry.count();
            info!(
                label = %answer,
                action_count,
                strategy = %growth.strategy,
                "New answer registered, growing action space"
            );
            self.agent.grow(action_count, growth.strategy)?;

            let known: Vec<QaPair> = self
                .corpus
                .iter()
                .filter(|pair| pair.question != question)
                .cloned()
                .collect();
            self.replay(&known, growth.replay_passes, growth.replay_epsilon)?;

            TeachOutcome::Grew(GrowthEvent {
                label: answer.clone(),
                action_count,
                strategy: growth.strategy,
                replayed_pairs: known.len(),
            })
        };

        for _ in 0..growth.imprint_passes {
            self.rehearse(&question, &answer)?;
        }
        Ok(outcome)
    }

    /// Re-present `pairs` at a fixed exploration rate, then restore epsilon.
    fn replay(&mut self, pairs: &[QaPair], passes: usize, epsilon: f64) -> Result<()> {
        let saved = self.agent.epsilon();
        self.agent.set_epsilon(epsilon);
        info!(pairs = pairs.len(), passes, "Replaying known pairs");
        let result = self.rehearse_all(pairs, passes);
        self.agent.set_epsilon(saved);
        result
    }

    fn rehearse_all(&mut self, pairs: &[QaPair], passes: usize) -> Result<()> {
        for _ in 0..passes {
            for pair in pairs {
                self.rehearse(&pair.question, &pair.answer)?;
            }
        }
        Ok(())
    }
}
