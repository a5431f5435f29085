//! Encrypted exchange pipeline.
//!
//! ```text
//! body ──► EncryptedEnvelope ──► FlowCodec::open ──► FlowRequest
//!                                      │                  │
//!                               ExchangeSession    FlowDispatcher
//!                                      │                  │
//!                                      └──► seal ◄── ResponsePayload
//! ```
//!
//! Each request runs the pipeline independently; nothing is shared between
//! requests except the server key and the provider.

use std::sync::Arc;

use flowgate_core::{DataProvider, FlowDispatcher};
use flowgate_crypto::FlowCodec;
use flowgate_proto::{EncryptedEnvelope, FlowRequest};
use serde_json::Value;

use crate::error::GatewayError;

/// Decrypts, dispatches and re-encrypts Flow exchanges.
pub struct FlowGateway {
    codec: FlowCodec,
    dispatcher: FlowDispatcher<Arc<dyn DataProvider>>,
}

impl FlowGateway {
    /// Gateway over a codec and a dispatcher.
    pub fn new(codec: FlowCodec, dispatcher: FlowDispatcher<Arc<dyn DataProvider>>) -> Self {
        Self { codec, dispatcher }
    }

    /// Dispatcher in use.
    pub fn dispatcher(&self) -> &FlowDispatcher<Arc<dyn DataProvider>> {
        &self.dispatcher
    }

    /// Answer one raw `POST /flow` body with the Base64 encrypted reply.
    ///
    /// # Errors
    ///
    /// - `Envelope`: body is not the three-field JSON envelope
    /// - `Codec`: bad Base64 or lengths, key unwrap or tag failure
    /// - `Schema`: decrypted plaintext is not a Flow request
    /// - `Encoding`: the reply could not be serialized
    pub async fn exchange(&self, body: &[u8]) -> Result<String, GatewayError> {
        let envelope = EncryptedEnvelope::from_json(body).map_err(GatewayError::Envelope)?;

        let opened = self
            .codec
            .open(&envelope.encrypted_flow_data, &envelope.encrypted_aes_key, &envelope.initial_vector)
            .inspect_err(|e| tracing::warn!(error = %e, "rejected flow envelope"))?;

        let request = FlowRequest::parse(&opened.plaintext).map_err(|source| {
            let (screen, action) = loose_labels(&opened.plaintext);
            tracing::warn!(error = %source, ?screen, ?action, "decrypted request failed schema validation");
            GatewayError::Schema { source, screen, action }
        })?;

        let payload = self.dispatcher.handle(&request).await;
        let plaintext = payload.to_json_bytes().map_err(|e| {
            tracing::error!(error = %e, "response encoding failed");
            GatewayError::Encoding(e)
        })?;

        Ok(opened.session.seal(&plaintext))
    }
}

/// Best-effort `screen` and `action` from a request that failed validation.
fn loose_labels(plaintext: &[u8]) -> (Option<String>, Option<String>) {
    let Ok(Value::Object(fields)) = serde_json::from_slice::<Value>(plaintext) else {
        return (None, None);
    };
    let label = |key: &str| fields.get(key).and_then(Value::as_str).map(str::to_string);

    (label("screen"), label("action"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_survive_a_bad_request() {
        let (screen, action) = loose_labels(br#"{"screen":"VIEW_ORDER","action":7}"#);

        assert_eq!(screen.as_deref(), Some("VIEW_ORDER"));
        assert_eq!(action, None);
        assert_eq!(loose_labels(b"\xff\xfe"), (None, None));
    }
}
