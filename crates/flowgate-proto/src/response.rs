//! Outbound response payload.

use serde::Serialize;

use crate::{
    FLOW_VERSION,
    errors::ProtocolError,
    payloads::{HealthData, NoticeData, ScreenData},
    screen::ScreenId,
};

/// Plaintext reply, encrypted by the codec before it leaves the process.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsePayload {
    /// Always [`FLOW_VERSION`]
    pub version: String,
    /// Screen to show next; absent for partial updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screen: Option<ScreenId>,
    /// Screen data
    pub data: ScreenData,
}

impl ResponsePayload {
    /// Move the client to `screen`.
    pub fn navigate(screen: ScreenId, data: ScreenData) -> Self {
        Self { version: FLOW_VERSION.to_string(), screen: Some(screen), data }
    }

    /// Update the current screen in place.
    pub fn refresh(data: ScreenData) -> Self {
        Self { version: FLOW_VERSION.to_string(), screen: None, data }
    }

    /// Reply to `ping`.
    pub fn health() -> Self {
        Self::refresh(ScreenData::Health(HealthData { status: "active".to_string() }))
    }

    /// Generic soft error on the current screen.
    pub fn notice(message: impl Into<String>) -> Self {
        Self::refresh(ScreenData::Notice(NoticeData { error: message.into() }))
    }

    /// True when the client stays on its current screen.
    pub fn is_partial(&self) -> bool {
        self.screen.is_none()
    }

    /// Serialize to the JSON bytes that get encrypted.
    ///
    /// # Errors
    ///
    /// - `Encoding`: serializer failure
    pub fn to_json_bytes(&self) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(self).map_err(|e| ProtocolError::Encoding(e.to_string()))
    }
}
