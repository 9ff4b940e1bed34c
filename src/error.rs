//! Error types for the qlearn crate

use thiserror::Error;

/// Main error type for the qlearn crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("unknown action label '{label}'")]
    UnknownAction { label: String },

    #[error("action index {index} is out of range (registry holds {count} actions)")]
    UnknownActionIndex { index: usize, count: usize },

    #[error("state vector has length {got}, expected {expected}")]
    StateSizeMismatch { expected: usize, got: usize },

    #[error("target vector has length {got}, expected {expected}")]
    TargetSizeMismatch { expected: usize, got: usize },

    #[error("action space is empty")]
    EmptyActionSpace,

    #[error("cannot shrink action space from {current} to {requested} actions")]
    ActionSpaceShrink { current: usize, requested: usize },

    #[error("registry holds {registry} actions but the approximator outputs {approximator}")]
    ActionCountMismatch { registry: usize, approximator: usize },

    #[error("training corpus is empty")]
    EmptyCorpus,

    #[error("failed to load corpus from '{path}': {message}")]
    CorpusLoad { path: String, message: String },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid {kind} '{input}'. Expected one of: {expected}")]
    ParseOption {
        kind: String,
        input: String,
        expected: String,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }

    pub(crate) fn parse_option(kind: &str, input: &str, expected: &str) -> Self {
        Error::ParseOption {
            kind: kind.to_string(),
            input: input.to_string(),
            expected: expected.to_string(),
        }
    }
}
