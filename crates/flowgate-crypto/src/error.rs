//! Codec error types

use thiserror::Error;

/// Errors from the envelope codec.
///
/// Messages are deliberately generic: they end up in operator-visible HTTP
/// diagnostics and must not describe key material or padding internals.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// An envelope field is not valid Base64 or has an impossible length
    #[error("malformed envelope field `{field}`: {reason}")]
    MalformedEnvelope {
        /// Envelope field name
        field: &'static str,
        /// What was wrong with it
        reason: String,
    },

    /// The session key could not be recovered
    #[error("session key could not be unwrapped")]
    KeyUnwrap,

    /// The session key could not be wrapped (client side)
    #[error("session key could not be wrapped")]
    KeyWrap,

    /// GCM tag did not verify
    #[error("payload authentication failed")]
    Authentication,

    /// The server private key could not be loaded
    #[error("private key could not be loaded: {reason}")]
    KeyLoad {
        /// Generic cause, never key content
        reason: &'static str,
    },
}

impl CodecError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedEnvelope { field, reason: reason.into() }
    }
}
