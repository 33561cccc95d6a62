//! Inbound webhook deliveries.
//!
//! Every level of the envelope is optional on the wire. Missing arrays decode
//! as empty, and a message that cannot be decoded at all is dropped instead of
//! failing the whole delivery.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// ============================================================================
// Envelope
// ============================================================================

/// A single webhook delivery (`POST /webhook` body).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub object: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub entry: Vec<Entry>,
}

impl WebhookPayload {
    /// Decode a raw request body.
    ///
    /// Malformed JSON yields `Err`; callers that must acknowledge every
    /// delivery can fall back to [`WebhookPayload::default`].
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body)
    }

    /// All messages in the delivery, in arrival order.
    pub fn messages(&self) -> impl Iterator<Item = &InboundMessage> {
        self.entry
            .iter()
            .flat_map(|entry| entry.changes.iter())
            .flat_map(|change| change.value.messages.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Change {
    #[serde(default)]
    pub field: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: ChangeValue,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub contacts: Option<serde_json::Value>,
    /// Status-only deliveries carry no `messages` key.
    #[serde(default, deserialize_with = "lenient_messages")]
    pub messages: Vec<InboundMessage>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_messages<'de, D>(deserializer: D) -> Result<Vec<InboundMessage>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<serde_json::Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|value| serde_json::from_value(value).ok())
        .collect())
}

// ============================================================================
// Messages
// ============================================================================

/// One inbound message unit.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawMessage")]
pub struct InboundMessage {
    pub from: Option<String>,
    pub id: Option<String>,
    pub timestamp: Option<String>,
    pub content: MessageContent,
}

/// Message body, tagged by the wire `type` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    Text { body: String },
    Button(ButtonReply),
    Interactive(InteractiveReply),
    /// Any other type (image, audio, reaction, ...) or a missing `type`.
    Unsupported { kind: Option<String> },
}

/// Legacy quick-reply button (`type: "button"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonReply {
    #[serde(default)]
    pub payload: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Interactive reply (`type: "interactive"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractiveReply {
    #[serde(default)]
    pub button_reply: Option<ReplyRef>,
    #[serde(default)]
    pub list_reply: Option<ReplyRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyRef {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl InboundMessage {
    /// Sender phone number; `None` when missing or blank.
    pub fn sender(&self) -> Option<&str> {
        non_empty(self.from.as_deref())
    }

    /// Trimmed free text. Empty for anything but text messages.
    pub fn text(&self) -> &str {
        match &self.content {
            MessageContent::Text { body } => body.trim(),
            _ => "",
        }
    }

    /// Structured reply choice from a button or interactive payload.
    ///
    /// Button payload wins over button text, reply id over reply title, and
    /// a button reply over a list reply unless the button reply is empty.
    pub fn reply_token(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Button(button) => {
                non_empty(button.payload.as_deref()).or(non_empty(button.text.as_deref()))
            }
            MessageContent::Interactive(reply) => [&reply.button_reply, &reply.list_reply]
                .into_iter()
                .flatten()
                .find_map(|selected| {
                    non_empty(selected.id.as_deref()).or(non_empty(selected.title.as_deref()))
                }),
            _ => None,
        }
    }

    /// Wire `type` name.
    pub fn kind(&self) -> &str {
        match &self.content {
            MessageContent::Text { .. } => "text",
            MessageContent::Button(_) => "button",
            MessageContent::Interactive(_) => "interactive",
            MessageContent::Unsupported { kind } => kind.as_deref().unwrap_or("unknown"),
        }
    }

    /// Platform timestamp (unix seconds as a string) as a UTC time.
    pub fn received_at(&self) -> Option<DateTime<Utc>> {
        let secs = self.timestamp.as_deref()?.trim().parse::<i64>().ok()?;
        DateTime::from_timestamp(secs, 0)
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

// --- Raw wire form ---

#[derive(Deserialize)]
struct RawMessage {
    #[serde(default)]
    from: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    text: Option<RawText>,
    #[serde(default)]
    button: Option<ButtonReply>,
    #[serde(default)]
    interactive: Option<InteractiveReply>,
}

#[derive(Deserialize)]
struct RawText {
    #[serde(default)]
    body: Option<String>,
}

impl From<RawMessage> for InboundMessage {
    fn from(raw: RawMessage) -> Self {
        let content = match raw.kind.as_deref() {
            Some("text") => MessageContent::Text {
                body: raw.text.and_then(|t| t.body).unwrap_or_default(),
            },
            Some("button") => MessageContent::Button(raw.button.unwrap_or_default()),
            Some("interactive") => MessageContent::Interactive(raw.interactive.unwrap_or_default()),
            _ => MessageContent::Unsupported { kind: raw.kind },
        };

        Self {
            from: raw.from,
            id: raw.id,
            timestamp: raw.timestamp,
            content,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
