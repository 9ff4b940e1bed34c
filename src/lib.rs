//! Online Q-learning agents with a growable action space
//!
//! This crate provides:
//! - A Q-learning agent over a small multilayer perceptron
//! - Epsilon-greedy exploration with multiplicative decay
//! - An append-only registry mapping response labels to action indices
//! - Text and coordinate state encoders
//! - A Q&A chatbot that grows its action space when taught new answers
//! - Grid world and letter-chain environments
//! - A training pipeline with progress, report, metrics and CSV observers

pub mod adapters;
pub mod agent;
pub mod app;
pub mod approximator;
pub mod chatbot;
pub mod cli;
pub mod corpus;
pub mod encoding;
pub mod env;
pub mod error;
pub mod learning;
pub mod pipeline;
pub mod policy;
pub mod ports;
pub mod registry;
pub mod reward;

pub use agent::Agent;
pub use app::{AgentConfig, App, ChatConfig, ChatLearning, GrowthConfig, UnknownLabelPolicy};
pub use approximator::{GrowthStrategy, Mlp, NetworkConfig, ValueApproximator};
pub use chatbot::{Chatbot, Evaluation, SavedChatbot, TeachOutcome, TrainingStats};
pub use corpus::{QaPair, TrainingCorpus};
pub use encoding::{StateEncoder, StateVector, TextEncoding};
pub use error::{Error, Result};
pub use learning::{TdStep, TdUpdate};
pub use policy::{Decision, EpsilonGreedy};
pub use registry::ActionRegistry;
pub use reward::{ExactMatchReward, OverlapReward};
