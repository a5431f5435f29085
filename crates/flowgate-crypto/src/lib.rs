//! Flowgate Cryptographic Codec
//!
//! Hybrid encryption for the Flow exchange. The messaging platform generates
//! a fresh AES session key per request, wraps it under the server's RSA
//! public key and encrypts the request body with AES-GCM. The server answers
//! under the same session key with the initialization vector inverted.
//!
//! ```text
//! encrypted_aes_key ──► RSA-OAEP(SHA-256, MGF1-SHA-256) ──► SessionKey
//!                                                              │
//! initial_vector ─────────────────────────────► GcmNonce       │
//!                                                  │           │
//! encrypted_flow_data = body ‖ tag ──► AES-GCM open ◄──────────┘
//!                                                  │
//!                                                  ▼
//!                                             plaintext
//!
//! response JSON ──► AES-GCM seal(SessionKey, !nonce) ──► Base64(body ‖ tag)
//! ```
//!
//! # Security
//!
//! Key handling:
//! - The RSA private key is loaded once and never printed; `Debug` is redacted
//! - Session keys are zeroized when dropped
//!
//! Failure reporting:
//! - Every RSA failure, including an unwrapped key of the wrong size, is one
//!   opaque [`CodecError::KeyUnwrap`] so the endpoint is not a padding oracle
//! - A tag mismatch is [`CodecError::Authentication`] and yields no plaintext
//!
//! Nonce discipline:
//! - The response nonce is the bitwise complement of the request nonce, so a
//!   session key never encrypts two messages under the same nonce

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aead;
pub mod client;
pub mod codec;
pub mod error;
pub mod key;

pub use aead::{GCM_TAG_SIZE, GcmNonce};
pub use client::{SealedRequest, open_response, seal_request};
pub use codec::{ExchangeSession, FlowCodec, OpenedRequest};
pub use error::CodecError;
pub use key::{ServerKey, SessionKey};
pub use rsa::{RsaPrivateKey, RsaPublicKey};
