//! Fuzz target for envelope parsing and decryption
//!
//! # Strategy
//!
//! - Raw bodies: arbitrary bytes as the HTTP body
//! - Field soup: arbitrary strings in the three Base64 fields
//! - Bit flips: a genuine sealed request with one byte of one field altered
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - An altered genuine request is never accepted with different plaintext
//! - The untouched genuine request always opens

#![no_main]

use std::sync::OnceLock;

use arbitrary::Arbitrary;
use flowgate_crypto::{FlowCodec, GcmNonce, RsaPrivateKey, ServerKey, SessionKey, seal_request};
use flowgate_proto::EncryptedEnvelope;
use libfuzzer_sys::fuzz_target;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

#[derive(Debug, Clone, Arbitrary)]
enum EnvelopeInput {
    RawBody { body: Vec<u8> },
    FieldSoup { data: String, key: String, iv: String },
    BitFlip { plaintext: Vec<u8>, long_key: bool, long_iv: bool, field: u8, position: u16, mask: u8 },
}

fn rsa_key() -> &'static RsaPrivateKey {
    static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let mut rng = ChaCha20Rng::seed_from_u64(0x00F1_0A7E);
        RsaPrivateKey::new(&mut rng, 2048).expect("key generation")
    })
}

fn codec() -> &'static FlowCodec {
    static CODEC: OnceLock<FlowCodec> = OnceLock::new();
    CODEC.get_or_init(|| FlowCodec::new(ServerKey::from_rsa(rsa_key().clone()).expect("2048-bit key")))
}

fuzz_target!(|input: EnvelopeInput| {
    match input {
        EnvelopeInput::RawBody { body } => {
            if let Ok(envelope) = EncryptedEnvelope::from_json(&body) {
                let _ = codec().open(&envelope.encrypted_flow_data, &envelope.encrypted_aes_key, &envelope.initial_vector);
            }
        },

        EnvelopeInput::FieldSoup { data, key, iv } => {
            let _ = codec().open(&data, &key, &iv);
        },

        EnvelopeInput::BitFlip { plaintext, long_key, long_iv, field, position, mask } => {
            let mut rng = ChaCha20Rng::seed_from_u64(u64::from(position));
            let key_bytes = vec![0x5A; if long_key { 32 } else { 16 }];
            let iv_bytes = vec![0xC3; if long_iv { 16 } else { 12 }];
            let session_key = SessionKey::from_slice(&key_bytes).expect("valid key length");
            let nonce = GcmNonce::from_slice(&iv_bytes).expect("valid nonce length");

            let mut sealed = seal_request(&rsa_key().to_public_key(), &session_key, &nonce, &plaintext, &mut rng)
                .expect("seal with 2048-bit key");

            let genuine = codec()
                .open(&sealed.encrypted_flow_data, &sealed.encrypted_aes_key, &sealed.initial_vector)
                .expect("genuine request must open");
            assert_eq!(genuine.plaintext, plaintext);

            if mask == 0 {
                return;
            }
            let target = match field % 3 {
                0 => &mut sealed.encrypted_flow_data,
                1 => &mut sealed.encrypted_aes_key,
                _ => &mut sealed.initial_vector,
            };
            let mut bytes = std::mem::take(target).into_bytes();
            if bytes.is_empty() {
                return;
            }
            let index = usize::from(position) % bytes.len();
            bytes[index] ^= mask;
            *target = String::from_utf8_lossy(&bytes).into_owned();

            if let Ok(opened) = codec().open(&sealed.encrypted_flow_data, &sealed.encrypted_aes_key, &sealed.initial_vector)
            {
                // Base64 padding bits can absorb a flip; the payload must then be unchanged.
                assert_eq!(opened.plaintext, plaintext, "tampered envelope opened to different plaintext");
            }
        },
    }
});
