//! AES-GCM body encryption.
//!
//! The platform uses standard 12-byte IVs on some client builds and 16-byte
//! IVs on others; the GCM construction is parameterized on the nonce size, so
//! the four (key size, nonce size) combinations map to four cipher types.
//! The tag is always 16 bytes and travels appended to the ciphertext.
//!
//! All functions are pure; nonces come from the caller.

use aes_gcm::{
    Aes128Gcm, Aes256Gcm, AesGcm,
    aead::{AeadCore, AeadInPlace, KeyInit, consts::U16, generic_array::GenericArray},
    aes::{Aes128, Aes256},
};

use crate::{error::CodecError, key::SessionKey};

/// GCM tag size (16 bytes)
pub const GCM_TAG_SIZE: usize = 16;

type Aes128Gcm16 = AesGcm<Aes128, U16>;
type Aes256Gcm16 = AesGcm<Aes256, U16>;

/// A validated GCM initialization vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcmNonce {
    /// Standard 96-bit IV
    Standard([u8; 12]),
    /// 128-bit IV
    Extended([u8; 16]),
}

impl GcmNonce {
    /// Build from raw bytes, `None` unless 12 or 16 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        match bytes.len() {
            12 => {
                let mut nonce = [0u8; 12];
                nonce.copy_from_slice(bytes);
                Some(Self::Standard(nonce))
            },
            16 => {
                let mut nonce = [0u8; 16];
                nonce.copy_from_slice(bytes);
                Some(Self::Extended(nonce))
            },
            _ => None,
        }
    }

    /// Bitwise complement of every byte. The response nonce.
    #[must_use]
    pub fn flipped(&self) -> Self {
        match self {
            Self::Standard(nonce) => Self::Standard(nonce.map(|b| b ^ 0xFF)),
            Self::Extended(nonce) => Self::Extended(nonce.map(|b| b ^ 0xFF)),
        }
    }

    /// Raw nonce bytes.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Standard(nonce) => nonce.as_slice(),
            Self::Extended(nonce) => nonce.as_slice(),
        }
    }
}

/// Encrypt `plaintext`, returning `ciphertext ‖ tag`.
pub fn seal_body(key: &SessionKey, nonce: &GcmNonce, plaintext: &[u8]) -> Vec<u8> {
    match (key, nonce) {
        (SessionKey::Aes128(k), GcmNonce::Standard(n)) => seal_with::<Aes128Gcm>(k, n, plaintext),
        (SessionKey::Aes128(k), GcmNonce::Extended(n)) => seal_with::<Aes128Gcm16>(k, n, plaintext),
        (SessionKey::Aes256(k), GcmNonce::Standard(n)) => seal_with::<Aes256Gcm>(k, n, plaintext),
        (SessionKey::Aes256(k), GcmNonce::Extended(n)) => seal_with::<Aes256Gcm16>(k, n, plaintext),
    }
}

/// Decrypt `ciphertext ‖ tag`.
///
/// # Errors
///
/// - `MalformedEnvelope`: input shorter than the tag
/// - `Authentication`: tag mismatch; nothing is returned
pub fn open_body(key: &SessionKey, nonce: &GcmNonce, sealed: &[u8]) -> Result<Vec<u8>, CodecError> {
    let Some(body_len) = sealed.len().checked_sub(GCM_TAG_SIZE) else {
        return Err(CodecError::malformed("encrypted_flow_data", "shorter than the GCM tag"));
    };
    let (body, tag) = sealed.split_at(body_len);

    match (key, nonce) {
        (SessionKey::Aes128(k), GcmNonce::Standard(n)) => open_with::<Aes128Gcm>(k, n, body, tag),
        (SessionKey::Aes128(k), GcmNonce::Extended(n)) => open_with::<Aes128Gcm16>(k, n, body, tag),
        (SessionKey::Aes256(k), GcmNonce::Standard(n)) => open_with::<Aes256Gcm>(k, n, body, tag),
        (SessionKey::Aes256(k), GcmNonce::Extended(n)) => open_with::<Aes256Gcm16>(k, n, body, tag),
    }
}

fn seal_with<C>(key: &[u8], nonce: &[u8], plaintext: &[u8]) -> Vec<u8>
where
    C: KeyInit + AeadInPlace,
{
    let Ok(cipher) = C::new_from_slice(key) else {
        unreachable!("session key length is fixed by its variant");
    };

    let mut buffer = plaintext.to_vec();
    let Ok(tag) =
        cipher.encrypt_in_place_detached(GenericArray::<u8, <C as AeadCore>::NonceSize>::from_slice(nonce), b"", &mut buffer)
    else {
        unreachable!("AES-GCM encryption cannot fail below the 64 GiB message limit");
    };

    buffer.extend_from_slice(&tag);
    buffer
}

fn open_with<C>(key: &[u8], nonce: &[u8], body: &[u8], tag: &[u8]) -> Result<Vec<u8>, CodecError>
where
    C: KeyInit + AeadInPlace,
{
    let Ok(cipher) = C::new_from_slice(key) else {
        unreachable!("session key length is fixed by its variant");
    };

    let mut buffer = body.to_vec();
    cipher
        .decrypt_in_place_detached(
            GenericArray::<u8, <C as AeadCore>::NonceSize>::from_slice(nonce),
            b"",
            &mut buffer,
            GenericArray::<u8, <C as AeadCore>::TagSize>::from_slice(tag),
        )
        .map_err(|_| CodecError::Authentication)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key256() -> SessionKey {
        SessionKey::from_slice(&[0x11; 32]).unwrap()
    }

    #[test]
    fn flipped_nonce_inverts_every_byte() {
        let nonce = GcmNonce::from_slice(&[0x00, 0xFF, 0x0F, 0xA5, 1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
        let flipped = nonce.flipped();

        assert_eq!(flipped.as_bytes()[..4], [0xFF, 0x00, 0xF0, 0x5A]);
        assert_eq!(flipped.flipped(), nonce);
    }

    #[test]
    fn nonce_length_must_be_12_or_16() {
        assert!(GcmNonce::from_slice(&[0; 12]).is_some());
        assert!(GcmNonce::from_slice(&[0; 16]).is_some());
        assert!(GcmNonce::from_slice(&[0; 8]).is_none());
        assert!(GcmNonce::from_slice(&[0; 24]).is_none());
    }

    #[test]
    fn sealed_output_is_plaintext_plus_tag() {
        let nonce = GcmNonce::from_slice(&[7; 16]).unwrap();
        let sealed = seal_body(&key256(), &nonce, b"hello");

        assert_eq!(sealed.len(), 5 + GCM_TAG_SIZE);
        assert_eq!(open_body(&key256(), &nonce, &sealed).unwrap(), b"hello");
    }

    #[test]
    fn every_key_and_nonce_size_combination_works() {
        for key_len in [16, 32] {
            for nonce_len in [12, 16] {
                let key = SessionKey::from_slice(&vec![0x42; key_len]).unwrap();
                let nonce = GcmNonce::from_slice(&vec![0x24; nonce_len]).unwrap();

                let sealed = seal_body(&key, &nonce, b"{}");
                assert_eq!(open_body(&key, &nonce, &sealed).unwrap(), b"{}");
            }
        }
    }

    #[test]
    fn wrong_nonce_fails_authentication() {
        let nonce = GcmNonce::from_slice(&[7; 12]).unwrap();
        let sealed = seal_body(&key256(), &nonce, b"hello");

        assert_eq!(open_body(&key256(), &nonce.flipped(), &sealed), Err(CodecError::Authentication));
    }

    #[test]
    fn input_shorter_than_tag_is_malformed() {
        let nonce = GcmNonce::from_slice(&[7; 12]).unwrap();
        let err = open_body(&key256(), &nonce, &[0u8; 15]).unwrap_err();

        assert!(matches!(err, CodecError::MalformedEnvelope { .. }));
    }

    #[test]
    fn empty_body_with_valid_tag_opens_to_empty_plaintext() {
        let nonce = GcmNonce::from_slice(&[3; 12]).unwrap();
        let sealed = seal_body(&key256(), &nonce, b"");

        assert_eq!(sealed.len(), GCM_TAG_SIZE);
        assert!(open_body(&key256(), &nonce, &sealed).unwrap().is_empty());
    }
}
