//! MessagePack implementation of the model repository.
//!
//! This adapter implements the ModelRepository port using rmp_serde for
//! compact binary serialization.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use tracing::info;

use crate::{Result, chatbot::SavedChatbot, error::Error, ports::ModelRepository};

/// MessagePack-based chatbot repository.
///
/// # Examples
///
/// ```no_run
/// use qlearn::adapters::MsgPackRepository;
/// use qlearn::ports::ModelRepository;
/// use std::path::Path;
///
/// let repo = MsgPackRepository;
/// let snapshot = repo.load(Path::new("chatbot.msgpack"))?;
/// let chatbot = snapshot.into_chatbot()?;
/// # Ok::<(), qlearn::Error>(())
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackRepository;

impl MsgPackRepository {
    pub fn new() -> Self {
        Self
    }
}

impl ModelRepository for MsgPackRepository {
    fn save(&self, snapshot: &SavedChatbot, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        let mut writer = BufWriter::new(file);

        rmp_serde::encode::write(&mut writer, snapshot).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize chatbot to MessagePack".to_string(),
                message: e.to_string(),
            }
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: format!("flush file {path:?}"),
            source,
        })?;

        info!(path = %path.display(), actions = snapshot.registry.count(), "Saved chatbot");
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<SavedChatbot> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let snapshot: SavedChatbot = rmp_serde::decode::from_read(BufReader::new(file))
            .map_err(|e| Error::SerializationContext {
                operation: "deserialize chatbot from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        info!(
            path = %path.display(),
            version = snapshot.version,
            actions = snapshot.registry.count(),
            "Loaded chatbot"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::{
        app::{AgentConfig, ChatConfig},
        approximator::NetworkConfig,
        chatbot::Chatbot,
        corpus::TrainingCorpus,
    };

    fn snapshot() -> SavedChatbot {
        let corpus = TrainingCorpus::from_pairs([("hola", "buenas"), ("adios", "chao")]);
        let bot = Chatbot::new(
            corpus,
            ChatConfig::default(),
            &AgentConfig::new().with_seed(1),
            NetworkConfig::new(vec![4], 0.01).with_seed(1),
        )
        .expect("Failed to create chatbot");
        SavedChatbot::from_chatbot(&bot)
    }

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("chatbot.msgpack");

        let repo = MsgPackRepository::new();
        let snapshot = snapshot();

        repo.save(&snapshot, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");

        assert_eq!(loaded.registry, snapshot.registry);
        assert_eq!(loaded.corpus, snapshot.corpus);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_12345.msgpack"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.save(&snapshot(), Path::new("/invalid_dir_12345/file.msgpack"));
        assert!(result.is_err());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_save_to_full_device_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.save(&snapshot(), Path::new("/dev/full"));
        assert!(matches!(
            result,
            Err(Error::Io { .. } | Error::SerializationContext { .. })
        ));
    }
}
