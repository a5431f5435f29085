//! Client side of the exchange.
//!
//! Performs the messaging platform's half: wrap a session key, encrypt a
//! request, decrypt the reply. Used by integration tests, fuzz targets and
//! local tooling that drives the server without the platform.

use base64::{Engine, engine::general_purpose::STANDARD};
use rsa::{Oaep, RsaPublicKey, rand_core::CryptoRngCore};
use sha2::Sha256;

use crate::{
    aead::{GcmNonce, open_body, seal_body},
    codec::ExchangeSession,
    error::CodecError,
    key::SessionKey,
};

/// The three Base64 fields of an envelope, as the platform posts them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedRequest {
    /// `Base64(ciphertext ‖ tag)`
    pub encrypted_flow_data: String,
    /// `Base64(RSA-OAEP(session key))`
    pub encrypted_aes_key: String,
    /// `Base64(iv)`
    pub initial_vector: String,
}

/// Encrypt `plaintext` for the server owning `server_public_key`.
///
/// # Errors
///
/// - `KeyWrap`: RSA-OAEP encryption failed (key too small for OAEP-SHA256)
pub fn seal_request<R: CryptoRngCore>(
    server_public_key: &RsaPublicKey,
    session_key: &SessionKey,
    nonce: &GcmNonce,
    plaintext: &[u8],
    rng: &mut R,
) -> Result<SealedRequest, CodecError> {
    let wrapped = server_public_key
        .encrypt(rng, Oaep::new::<Sha256>(), session_key.as_bytes())
        .map_err(|_| CodecError::KeyWrap)?;

    Ok(SealedRequest {
        encrypted_flow_data: STANDARD.encode(seal_body(session_key, nonce, plaintext)),
        encrypted_aes_key: STANDARD.encode(wrapped),
        initial_vector: STANDARD.encode(nonce.as_bytes()),
    })
}

/// Decrypt the server's reply to a request sealed under `session`.
///
/// # Errors
///
/// - `MalformedEnvelope`: reply is not Base64 or shorter than the tag
/// - `Authentication`: tag mismatch
pub fn open_response(session: &ExchangeSession, response_b64: &str) -> Result<Vec<u8>, CodecError> {
    let sealed = STANDARD
        .decode(response_b64.trim())
        .map_err(|e| CodecError::malformed("response", e.to_string()))?;
    open_body(session.key(), &session.response_nonce(), &sealed)
}
