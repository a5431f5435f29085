//! Server error types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use flowgate_crypto::CodecError;
use flowgate_proto::ProtocolError;
use serde::Serialize;
use thiserror::Error;

use crate::storage::StorageError;

/// Errors that stop the server from starting or serving.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuration error (bad bind address, unreadable key or catalog).
    ///
    /// Fatal at startup. Fix configuration and restart.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport/network error (bind failure, listener I/O).
    #[error("transport error: {0}")]
    Transport(String),

    /// Storage backend could not be opened or seeded.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<CodecError> for ServerError {
    fn from(err: CodecError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Failures of one `POST /flow` exchange.
///
/// Each maps to an HTTP status the platform acts on; the body is an
/// unencrypted JSON diagnostic. Crypto failures share one generic message so
/// the response never says which step failed.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Body is not a JSON envelope with the three fields
    #[error(transparent)]
    Envelope(ProtocolError),

    /// Envelope could not be decrypted
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Decrypted plaintext is not a valid Flow request
    #[error("{source}")]
    Schema {
        /// Parser diagnostic
        source: ProtocolError,
        /// Screen named in the plaintext, when it could be read
        screen: Option<String>,
        /// Action named in the plaintext, when it could be read
        action: Option<String>,
    },

    /// Response payload could not be serialized
    #[error(transparent)]
    Encoding(ProtocolError),
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    exception_type: &'a str,
    screen: Option<&'a str>,
    action: Option<&'a str>,
}

impl GatewayError {
    /// HTTP status for this failure.
    ///
    /// - Malformed envelope: 400 Bad Request
    /// - Key unwrap or tag mismatch: 421 Misdirected Request
    /// - Schema, encoding, key loading: 500 Internal Server Error
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Envelope(_) | Self::Codec(CodecError::MalformedEnvelope { .. }) => StatusCode::BAD_REQUEST,
            Self::Codec(CodecError::KeyUnwrap | CodecError::Authentication) => StatusCode::MISDIRECTED_REQUEST,
            Self::Codec(CodecError::KeyWrap | CodecError::KeyLoad { .. })
            | Self::Schema { .. }
            | Self::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Short machine-readable name of the failure.
    pub const fn exception_type(&self) -> &'static str {
        match self {
            Self::Envelope(_) | Self::Codec(CodecError::MalformedEnvelope { .. }) => "MalformedEnvelope",
            Self::Codec(CodecError::KeyUnwrap | CodecError::Authentication) => "DecryptionFailed",
            Self::Codec(CodecError::KeyWrap | CodecError::KeyLoad { .. }) => "KeyError",
            Self::Schema { .. } => "SchemaError",
            Self::Encoding(_) => "EncodingError",
        }
    }

    fn public_message(&self) -> String {
        match self {
            Self::Envelope(_) | Self::Codec(CodecError::MalformedEnvelope { .. }) => {
                "Malformed request envelope".to_string()
            },
            Self::Codec(_) => "Request could not be decrypted".to_string(),
            Self::Schema { source, .. } => source.to_string(),
            Self::Encoding(_) => "Response could not be encoded".to_string(),
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (screen, action) = match &self {
            Self::Schema { screen, action, .. } => (screen.as_deref(), action.as_deref()),
            _ => (None, None),
        };
        let body = ErrorBody {
            error: self.public_message(),
            exception_type: self.exception_type(),
            screen,
            action,
        };

        (self.status_code(), Json(body)).into_response()
    }
}
