//! Application layer: configuration and the dependency container.
//!
//! [`App`] holds the model repository and an optional default seed, and builds
//! agents and chatbots from plain configuration values. CLI commands and tests
//! go through it instead of wiring approximators and repositories by hand.
//!
//! ```text
//!   cli::commands ──► App ──creates──► Agent<Mlp> ──► TrainingPipeline
//!                      │                Chatbot
//!                      │
//!                      └──save/load──► dyn ModelRepository
//!                                        ├─ MsgPackRepository (files)
//!                                        └─ InMemoryRepository (tests)
//! ```
//!
//! # Usage
//!
//! ```
//! use qlearn::app::{AgentConfig, App, ChatConfig};
//! use qlearn::{NetworkConfig, TrainingCorpus};
//!
//! let app = App::for_testing().with_default_seed(42).build();
//! let corpus = TrainingCorpus::from_pairs([("hola", "buenas"), ("adios", "hasta luego")]);
//! let bot = app.create_chatbot(
//!     corpus,
//!     ChatConfig::default(),
//!     AgentConfig::new(),
//!     NetworkConfig::new(vec![8], 0.01),
//! )?;
//! assert_eq!(bot.registry().count(), 2);
//! # Ok::<(), qlearn::Error>(())
//! ```

pub mod config;
pub mod container;

pub use config::{AgentConfig, ChatConfig, ChatLearning, GrowthConfig, UnknownLabelPolicy};
pub use container::{App, AppBuilder};
