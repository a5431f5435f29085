//! Server side of the exchange.

use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroize;

use crate::{
    aead::{GcmNonce, open_body, seal_body},
    error::CodecError,
    key::{ServerKey, SessionKey},
};

/// Decrypts requests and encrypts responses with the server key.
///
/// Stateless apart from the key; share one instance across requests.
#[derive(Debug)]
pub struct FlowCodec {
    key: ServerKey,
}

/// A decrypted request body and the session needed to answer it.
#[derive(Debug)]
pub struct OpenedRequest {
    /// Decrypted request bytes (UTF-8 JSON when the client is well behaved)
    pub plaintext: Vec<u8>,
    /// Key and nonce for the reply
    pub session: ExchangeSession,
}

/// Per-request reply context.
#[derive(Debug)]
pub struct ExchangeSession {
    key: SessionKey,
    request_nonce: GcmNonce,
}

impl FlowCodec {
    /// Create a codec around the server key.
    pub fn new(key: ServerKey) -> Self {
        Self { key }
    }

    /// Server key in use.
    pub fn server_key(&self) -> &ServerKey {
        &self.key
    }

    /// Decrypt an inbound envelope given its three Base64 fields.
    ///
    /// # Errors
    ///
    /// - `MalformedEnvelope`: bad Base64, IV not 12 or 16 bytes, body shorter
    ///   than the tag
    /// - `KeyUnwrap`: RSA-OAEP failure or unwrapped key not 16 or 32 bytes
    /// - `Authentication`: GCM tag mismatch
    pub fn open(
        &self,
        encrypted_flow_data: &str,
        encrypted_aes_key: &str,
        initial_vector: &str,
    ) -> Result<OpenedRequest, CodecError> {
        let sealed = decode_field("encrypted_flow_data", encrypted_flow_data)?;
        let wrapped_key = decode_field("encrypted_aes_key", encrypted_aes_key)?;
        let iv = decode_field("initial_vector", initial_vector)?;

        let Some(request_nonce) = GcmNonce::from_slice(&iv) else {
            return Err(CodecError::malformed("initial_vector", format!("{} bytes, expected 12 or 16", iv.len())));
        };

        let session_key = self.unwrap_session_key(&wrapped_key)?;
        let plaintext = open_body(&session_key, &request_nonce, &sealed)?;

        Ok(OpenedRequest { plaintext, session: ExchangeSession { key: session_key, request_nonce } })
    }

    fn unwrap_session_key(&self, wrapped: &[u8]) -> Result<SessionKey, CodecError> {
        let mut raw = self.key.rsa().decrypt(Oaep::new::<Sha256>(), wrapped).map_err(|_| CodecError::KeyUnwrap)?;
        let key = SessionKey::from_slice(&raw);
        raw.zeroize();

        key.ok_or(CodecError::KeyUnwrap)
    }
}

impl ExchangeSession {
    /// Build a session directly, for clients that generated the key.
    pub fn new(key: SessionKey, request_nonce: GcmNonce) -> Self {
        Self { key, request_nonce }
    }

    /// Nonce the replies are encrypted under.
    pub fn response_nonce(&self) -> GcmNonce {
        self.request_nonce.flipped()
    }

    /// Encrypt a reply: `Base64(AES-GCM(plaintext, key, !nonce) ‖ tag)`.
    pub fn seal(&self, plaintext: &[u8]) -> String {
        STANDARD.encode(seal_body(&self.key, &self.response_nonce(), plaintext))
    }

    pub(crate) fn key(&self) -> &SessionKey {
        &self.key
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, CodecError> {
    STANDARD.decode(value.trim()).map_err(|e| CodecError::malformed(field, e.to_string()))
}
