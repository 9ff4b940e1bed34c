//! Serialization support for trained chatbots.

use serde::{Deserialize, Serialize};

use super::{Chatbot, TrainingStats};
use crate::{
    agent::{Agent, AgentState},
    app::ChatConfig,
    approximator::Mlp,
    corpus::TrainingCorpus,
    error::{Error, Result},
    registry::ActionRegistry,
};

/// Versioned snapshot of a [`Chatbot`] and everything needed to resume it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedChatbot {
    pub version: u32,
    agent: AgentState<Mlp>,
    pub registry: ActionRegistry,
    pub corpus: TrainingCorpus,
    pub config: ChatConfig,
    pub stats: TrainingStats,
}

impl SavedChatbot {
    pub const VERSION: u32 = 1;

    pub fn from_chatbot(chatbot: &Chatbot) -> Self {
        Self {
            version: Self::VERSION,
            agent: chatbot.agent.export_state(),
            registry: chatbot.registry.clone(),
            corpus: chatbot.corpus.clone(),
            config: chatbot.config.clone(),
            stats: chatbot.stats.clone(),
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.agent.policy.epsilon()
    }

    /// Rebuild the chatbot.
    ///
    /// The registry is restored as saved, so answers keep their indices even
    /// if the corpus order differs. Network layers that do not fit together
    /// are rejected before any prediction can index past them.
    pub fn into_chatbot(self) -> Result<Chatbot> {
        if self.version != Self::VERSION {
            return Err(Error::SerializationContext {
                operation: "restore chatbot snapshot".to_string(),
                message: format!(
                    "unsupported save format version {}, expected {}",
                    self.version,
                    Self::VERSION
                ),
            });
        }

        self.agent
            .approximator
            .validate_shape()
            .map_err(|err| Error::SerializationContext {
                operation: "restore chatbot network".to_string(),
                message: err.to_string(),
            })?;

        let agent = Agent::from_state(self.agent);
        let mut chatbot = Chatbot::assemble(agent, self.registry, self.corpus, self.config)?;
        chatbot.stats = self.stats;
        Ok(chatbot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::{AgentConfig, GrowthConfig},
        approximator::NetworkConfig,
    };

    fn trained() -> Chatbot {
        let corpus = TrainingCorpus::from_pairs([("hola", "buenas"), ("adios", "hasta luego")]);
        let config = ChatConfig::default().with_growth(GrowthConfig::default().with_passes(2, 2, 2));
        let mut bot = Chatbot::new(
            corpus,
            config,
            &AgentConfig::new().with_seed(8),
            NetworkConfig::new(vec![8], 0.01).with_seed(8),
        )
        .unwrap();
        bot.train_episode().unwrap();
        bot.teach("gracias", "de nada").unwrap();
        bot
    }

    #[test]
    fn test_snapshot_restores_replies() {
        let bot = trained();
        let restored = SavedChatbot::from_chatbot(&bot).into_chatbot().unwrap();

        assert_eq!(restored.registry(), bot.registry());
        assert_eq!(restored.stats(), bot.stats());
        assert_eq!(restored.agent().epsilon(), bot.agent().epsilon());
        for question in ["hola", "adios", "gracias"] {
            assert_eq!(restored.reply(question).unwrap(), bot.reply(question).unwrap());
        }
    }

    #[test]
    fn test_msgpack_bytes_round_trip() {
        let snapshot = SavedChatbot::from_chatbot(&trained());
        let bytes = rmp_serde::to_vec(&snapshot).unwrap();
        let decoded: SavedChatbot = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(decoded.registry.count(), 3);
        assert_eq!(decoded.epsilon(), snapshot.epsilon());
    }

    #[test]
    fn test_malformed_network_rejected() {
        let snapshot = SavedChatbot::from_chatbot(&trained());
        let mut value = serde_json::to_value(&snapshot).unwrap();
        let biases = value["agent"]["approximator"]["layers"][0]["biases"]
            .as_array_mut()
            .unwrap();
        biases.pop();
        let corrupted: SavedChatbot = serde_json::from_value(value).unwrap();

        assert!(matches!(
            corrupted.into_chatbot(),
            Err(Error::SerializationContext { .. })
        ));
    }

    #[test]
    fn test_unsupported_version_rejected() {
        let mut snapshot = SavedChatbot::from_chatbot(&trained());
        snapshot.version = 99;
        assert!(matches!(
            snapshot.into_chatbot(),
            Err(Error::SerializationContext { .. })
        ));
    }
}
