//! Sentiment service error types.
//!
//! Every failure during artifact loading or inference is surfaced as a
//! [`SentimentError`] and propagated to the caller; the service performs
//! no local recovery. The HTTP layer translates uncaught errors into
//! 500 responses with a human-readable message.

use std::path::PathBuf;

use thiserror::Error;

/// Sentiment service errors.
#[derive(Error, Debug)]
pub enum SentimentError {
    /// Required artifact file or directory missing at the expected path.
    #[error("Artifact not found: {}", .0.display())]
    ArtifactNotFound(PathBuf),

    /// Tokenizer resolution failed (identifier lookup or file parse).
    #[error("Tokenizer load error: {0}")]
    TokenizerLoad(String),

    /// Serialized artifact unreadable or corrupt.
    #[error("Deserialization error: {0}")]
    Deserialization(String),

    /// Network output shape or fields unexpected.
    #[error("Inference output error: {0}")]
    InferenceOutput(String),

    /// Tokenization of request text failed.
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for sentiment operations
pub type Result<T> = std::result::Result<T, SentimentError>;

impl From<toml::de::Error> for SentimentError {
    fn from(err: toml::de::Error) -> Self {
        SentimentError::Config(err.to_string())
    }
}
