//! Schema error types

use thiserror::Error;

/// Errors raised while parsing or producing Flow messages.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// The outer envelope is not valid JSON or lacks a field
    #[error("invalid envelope: {reason}")]
    InvalidEnvelope {
        /// Parser diagnostic
        reason: String,
    },

    /// Decrypted plaintext is not UTF-8 JSON of the expected shape
    #[error("invalid request: {reason}")]
    InvalidRequest {
        /// Parser diagnostic
        reason: String,
    },

    /// A mandatory request field is absent
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Screen name outside the closed set
    #[error("unknown screen: {0}")]
    UnknownScreen(String),

    /// Response could not be serialized
    #[error("response encoding failed: {0}")]
    Encoding(String),
}
