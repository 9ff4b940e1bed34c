//! Dependency injection container for the qlearn application.
//!
//! This module provides centralized dependency management following hexagonal
//! architecture principles. The container owns infrastructure dependencies and
//! provides factory methods for creating domain objects.

use std::{path::Path, sync::Arc};

use super::config::{AgentConfig, ChatConfig};
use crate::{
    Result,
    adapters::MsgPackRepository,
    agent::Agent,
    approximator::{Mlp, NetworkConfig},
    chatbot::{Chatbot, SavedChatbot},
    corpus::TrainingCorpus,
    ports::{Environment, ModelRepository},
};

/// Application with dependency injection.
///
/// # Examples
///
/// ## Production usage
///
/// ```
/// use qlearn::app::{AgentConfig, App};
/// use qlearn::approximator::NetworkConfig;
/// use qlearn::env::GridWorld;
///
/// let app = App::new();
/// let env = GridWorld::new();
/// let agent = app.create_agent(&env, AgentConfig::new().with_seed(42), NetworkConfig::default())?;
/// assert_eq!(agent.action_count(), 4);
/// # Ok::<(), qlearn::Error>(())
/// ```
///
/// ## Testing with dependency injection
///
/// ```
/// use qlearn::app::App;
/// use qlearn::adapters::InMemoryRepository;
///
/// let app = App::for_testing()
///     .with_repository(InMemoryRepository::new())
///     .with_default_seed(42)
///     .build();
/// ```
pub struct App {
    /// Repository for chatbot persistence
    model_repository: Arc<dyn ModelRepository + Send + Sync>,
    /// Default random seed (None = non-deterministic)
    default_seed: Option<u64>,
}

impl App {
    /// Create a new app with production defaults.
    ///
    /// Uses:
    /// - `MsgPackRepository` for chatbot persistence
    /// - No default seed (non-deterministic RNG)
    pub fn new() -> Self {
        Self {
            model_repository: Arc::new(MsgPackRepository::new()),
            default_seed: None,
        }
    }

    /// Create a builder for constructing app with custom dependencies.
    pub fn for_testing() -> AppBuilder {
        AppBuilder::new()
    }

    pub fn model_repository(&self) -> Arc<dyn ModelRepository + Send + Sync> {
        Arc::clone(&self.model_repository)
    }

    /// Fill in seeds missing from the configs with the container default.
    ///
    /// The network falls back to the agent seed so a single `--seed` makes
    /// the whole run reproducible.
    fn seeded(&self, config: AgentConfig, network: NetworkConfig) -> (AgentConfig, NetworkConfig) {
        let mut config = config;
        let mut network = network;
        if config.seed.is_none() {
            config.seed = self.default_seed;
        }
        if network.seed.is_none() {
            network.seed = config.seed;
        }
        (config, network)
    }

    /// Create an agent sized for `env`.
    pub fn create_agent<E: Environment + ?Sized>(
        &self,
        env: &E,
        config: AgentConfig,
        network: NetworkConfig,
    ) -> Result<Agent> {
        let (config, network) = self.seeded(config, network);
        let approximator = Mlp::new(env.state_size(), env.action_count(), network)?;
        Agent::new(approximator, &config)
    }

    /// Create a chatbot over `corpus`.
    pub fn create_chatbot(
        &self,
        corpus: TrainingCorpus,
        chat: ChatConfig,
        config: AgentConfig,
        network: NetworkConfig,
    ) -> Result<Chatbot> {
        let (config, network) = self.seeded(config, network);
        Chatbot::new(corpus, chat, &config, network)
    }

    /// Load a chatbot through the configured repository.
    pub fn load_chatbot(&self, path: &Path) -> Result<Chatbot> {
        self.model_repository.load(path)?.into_chatbot()
    }

    /// Save a chatbot through the configured repository.
    pub fn save_chatbot(&self, chatbot: &Chatbot, path: &Path) -> Result<()> {
        self.model_repository
            .save(&SavedChatbot::from_chatbot(chatbot), path)
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for constructing app with custom dependencies.
///
/// Primarily used for testing to inject in-memory repositories and control
/// randomness.
pub struct AppBuilder {
    model_repository: Option<Arc<dyn ModelRepository + Send + Sync>>,
    default_seed: Option<u64>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            model_repository: None,
            default_seed: None,
        }
    }

    /// Set a custom model repository.
    pub fn with_repository<R: ModelRepository + Send + Sync + 'static>(mut self, repo: R) -> Self {
        self.model_repository = Some(Arc::new(repo));
        self
    }

    /// Set a default random seed for everything created by this container.
    pub fn with_default_seed(mut self, seed: u64) -> Self {
        self.default_seed = Some(seed);
        self
    }

    /// Build the app with the configured dependencies.
    ///
    /// If no repository was specified, uses `MsgPackRepository` by default.
    pub fn build(self) -> App {
        App {
            model_repository: self
                .model_repository
                .unwrap_or_else(|| Arc::new(MsgPackRepository::new())),
            default_seed: self.default_seed,
        }
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use crate::{adapters::InMemoryRepository, env::GridWorld};

    fn corpus() -> TrainingCorpus {
        TrainingCorpus::from_pairs([("hola", "buenas"), ("que tal", "bien")])
    }

    #[test]
    fn test_app_creates_grid_agent() {
        let app = App::new();
        let agent = app
            .create_agent(&GridWorld::new(), AgentConfig::new(), NetworkConfig::default())
            .unwrap();
        assert_eq!(agent.state_size(), 2);
        assert_eq!(agent.action_count(), 4);
    }

    #[test]
    fn test_default_seed_makes_agents_identical() {
        let app = App::for_testing().with_default_seed(42).build();
        let env = GridWorld::new();
        let a = app
            .create_agent(&env, AgentConfig::new(), NetworkConfig::default())
            .unwrap();
        let b = app
            .create_agent(&env, AgentConfig::new(), NetworkConfig::default())
            .unwrap();
        assert_eq!(a.q_values(&[1.0, 2.0]).unwrap(), b.q_values(&[1.0, 2.0]).unwrap());
    }

    #[test]
    fn test_save_and_load_chatbot_through_repository() {
        let repo = InMemoryRepository::new();
        let app = App::for_testing()
            .with_repository(repo.clone())
            .with_default_seed(7)
            .build();

        let bot = app
            .create_chatbot(
                corpus(),
                ChatConfig::default(),
                AgentConfig::new(),
                NetworkConfig::new(vec![8], 0.01),
            )
            .unwrap();
        let path = Path::new("bot");
        app.save_chatbot(&bot, path).unwrap();
        assert!(repo.contains(path));

        let loaded = app.load_chatbot(path).unwrap();
        assert_eq!(loaded.reply("hola").unwrap(), bot.reply("hola").unwrap());
    }
}
