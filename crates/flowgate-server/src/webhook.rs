//! Messaging platform webhook: subscription check and inbound notifications.
//!
//! Notifications are acknowledged and logged. Message ids go through a
//! [`SeenCache`] so platform retries are logged once.

use serde::Deserialize;

use crate::dedup::SeenCache;

/// Query string of the subscription check (`GET /webhook`).
#[derive(Debug, Default, Deserialize)]
pub struct VerifyQuery {
    /// Must be `subscribe`
    #[serde(rename = "hub.mode")]
    pub mode: Option<String>,
    /// Token configured on the platform side
    #[serde(rename = "hub.verify_token")]
    pub verify_token: Option<String>,
    /// Value to echo back on success
    #[serde(rename = "hub.challenge")]
    pub challenge: Option<String>,
}

impl VerifyQuery {
    /// Challenge to echo when the check passes.
    ///
    /// An empty `expected_token` rejects every check.
    pub fn accept(&self, expected_token: &str) -> Option<String> {
        let subscribed = self.mode.as_deref() == Some("subscribe");
        let token_matches = !expected_token.is_empty() && self.verify_token.as_deref() == Some(expected_token);

        (subscribed && token_matches).then(|| self.challenge.clone().unwrap_or_default())
    }
}

/// Inbound notification body (`POST /webhook`).
///
/// Only the fields needed to find messages are modelled; everything else is
/// ignored, and missing lists are empty.
#[derive(Debug, Default, Deserialize)]
pub struct Notification {
    #[serde(default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(default)]
    changes: Vec<Change>,
}

#[derive(Debug, Default, Deserialize)]
struct Change {
    #[serde(default)]
    value: ChangeValue,
}

#[derive(Debug, Default, Deserialize)]
struct ChangeValue {
    #[serde(default)]
    messages: Vec<InboundMessage>,
}

/// One user message inside a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InboundMessage {
    /// Platform message id
    pub id: Option<String>,
    /// Sender number without the leading `+`
    pub from: Option<String>,
    /// Text content, for text messages
    pub text: Option<TextBody>,
}

/// Text message content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TextBody {
    /// Message text as typed
    #[serde(default)]
    pub body: String,
}

impl Notification {
    /// Parse a notification body.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    /// All messages, in delivery order.
    pub fn messages(&self) -> impl Iterator<Item = &InboundMessage> {
        self.entry.iter().flat_map(|entry| &entry.changes).flat_map(|change| &change.value.messages)
    }

    /// Messages not seen before; ids are recorded in `seen`.
    ///
    /// Messages without an id cannot be deduplicated and are always fresh.
    pub fn fresh_messages(&self, seen: &mut SeenCache) -> Vec<InboundMessage> {
        self.messages()
            .filter(|message| match message.id.as_deref() {
                Some(id) => {
                    let fresh = seen.first_sighting(id);
                    if !fresh {
                        tracing::debug!(message_id = id, "dropping redelivered webhook message");
                    }
                    fresh
                },
                None => true,
            })
            .cloned()
            .collect()
    }
}

impl InboundMessage {
    /// Sender in `+<digits>` form.
    pub fn sender(&self) -> Option<String> {
        let from = self.from.as_deref()?.trim();
        if from.is_empty() {
            return None;
        }
        Some(if from.starts_with('+') { from.to_string() } else { format!("+{from}") })
    }

    /// Trimmed, lowercased text, empty for non-text messages.
    pub fn command(&self) -> String {
        self.text.as_ref().map(|text| text.body.trim().to_lowercase()).unwrap_or_default()
    }
}
