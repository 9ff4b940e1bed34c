//! Repository port for chatbot persistence.
//!
//! This module defines the trait boundary between the domain and infrastructure
//! layers for snapshot storage and retrieval.

use std::path::Path;

use crate::{Result, chatbot::SavedChatbot};

/// Port for persisting and loading trained chatbots.
///
/// This trait abstracts the storage mechanism, allowing different implementations
/// (MessagePack, in-memory) without coupling the domain logic to specific
/// serialization formats.
///
/// # Examples
///
/// ```no_run
/// use qlearn::chatbot::SavedChatbot;
/// use qlearn::ports::ModelRepository;
/// use std::path::Path;
///
/// fn store<R: ModelRepository>(
///     repo: &R,
///     snapshot: &SavedChatbot,
///     path: &Path,
/// ) -> qlearn::Result<()> {
///     repo.save(snapshot, path)
/// }
/// ```
pub trait ModelRepository {
    /// Save a snapshot to persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The path cannot be created or written to
    /// - Serialization fails
    fn save(&self, snapshot: &SavedChatbot, path: &Path) -> Result<()>;

    /// Load a snapshot from persistent storage.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file does not exist or cannot be read
    /// - The file format is invalid or corrupted
    fn load(&self, path: &Path) -> Result<SavedChatbot>;
}
