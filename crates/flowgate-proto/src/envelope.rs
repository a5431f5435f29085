//! Inbound wire envelope.

use serde::{Deserialize, Serialize};

use crate::errors::ProtocolError;

/// The encrypted request body posted by the messaging platform.
///
/// All three fields are standard, padded Base64. The envelope is opaque to
/// everything except the crypto codec.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    /// AES-GCM ciphertext with the 16-byte tag appended
    pub encrypted_flow_data: String,
    /// Session key wrapped with RSA-OAEP under the server public key
    pub encrypted_aes_key: String,
    /// GCM initialization vector of the request
    pub initial_vector: String,
}

impl EncryptedEnvelope {
    /// Parse an envelope from a raw HTTP body.
    ///
    /// # Errors
    ///
    /// - `InvalidEnvelope`: body is not a JSON object with the three fields
    pub fn from_json(body: &[u8]) -> Result<Self, ProtocolError> {
        serde_json::from_slice(body)
            .map_err(|e| ProtocolError::InvalidEnvelope { reason: e.to_string() })
    }
}
