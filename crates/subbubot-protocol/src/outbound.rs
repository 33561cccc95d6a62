//! Outbound send payloads for `POST /{phone_number_id}/messages`.

use serde::{Deserialize, Serialize};

use crate::MESSAGING_PRODUCT;

// ============================================================================
// Requests
// ============================================================================

/// A message addressed to one WhatsApp user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundMessage {
    pub messaging_product: String,
    pub recipient_type: String,
    pub to: String,
    #[serde(flatten)]
    pub body: OutboundBody,
}

/// Message body, tagged on the wire by `type`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum OutboundBody {
    Text { text: TextContent },
    Image { image: MediaObject },
    Video { video: MediaObject },
    Interactive { interactive: InteractiveMessage },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub body: String,
    pub preview_url: bool,
}

/// Media referenced by public link.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaObject {
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
}

/// Which media field carries a [`MediaObject`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Interactive reply-button message.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<InteractiveHeader>,
    pub body: InteractiveText,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<InteractiveText>,
    pub action: InteractiveAction,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveHeader {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractiveAction {
    pub buttons: Vec<ReplyButton>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplyButton {
    #[serde(rename = "type")]
    pub kind: String,
    pub reply: ButtonRef,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ButtonRef {
    pub id: String,
    pub title: String,
}

impl InteractiveMessage {
    /// Platform limit on reply buttons per message.
    pub const MAX_BUTTONS: usize = 3;

    /// Reply-button message with the given body and `(id, title)` buttons.
    pub fn reply_buttons<I, S>(body: impl Into<String>, buttons: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            kind: "button".to_string(),
            header: None,
            body: InteractiveText { text: body.into() },
            footer: None,
            action: InteractiveAction {
                buttons: buttons
                    .into_iter()
                    .map(|(id, title)| ReplyButton {
                        kind: "reply".to_string(),
                        reply: ButtonRef {
                            id: id.into(),
                            title: title.into(),
                        },
                    })
                    .collect(),
            },
        }
    }
}

impl OutboundMessage {
    fn new(to: impl Into<String>, body: OutboundBody) -> Self {
        Self {
            messaging_product: MESSAGING_PRODUCT.to_string(),
            recipient_type: "individual".to_string(),
            to: to.into(),
            body,
        }
    }

    pub fn text(to: impl Into<String>, body: impl Into<String>) -> Self {
        Self::new(
            to,
            OutboundBody::Text {
                text: TextContent {
                    body: body.into(),
                    preview_url: false,
                },
            },
        )
    }

    pub fn media(
        to: impl Into<String>,
        kind: MediaKind,
        link: impl Into<String>,
        caption: Option<String>,
    ) -> Self {
        let media = MediaObject {
            link: link.into(),
            caption: caption.filter(|c| !c.is_empty()),
        };
        let body = match kind {
            MediaKind::Image => OutboundBody::Image { image: media },
            MediaKind::Video => OutboundBody::Video { video: media },
        };
        Self::new(to, body)
    }

    pub fn interactive(to: impl Into<String>, interactive: InteractiveMessage) -> Self {
        Self::new(to, OutboundBody::Interactive { interactive })
    }

    /// Wire `type` of the body, for logging.
    pub fn kind(&self) -> &'static str {
        match &self.body {
            OutboundBody::Text { .. } => "text",
            OutboundBody::Image { .. } => "image",
            OutboundBody::Video { .. } => "video",
            OutboundBody::Interactive { .. } => "interactive",
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Successful send response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SendMessageResponse {
    #[serde(default)]
    pub messaging_product: Option<String>,
    #[serde(default)]
    pub contacts: Vec<SentContact>,
    #[serde(default)]
    pub messages: Vec<SentMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentContact {
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub wa_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SentMessage {
    pub id: String,
}

impl SendMessageResponse {
    /// Id (`wamid.*`) of the first accepted message.
    pub fn message_id(&self) -> Option<&str> {
        self.messages.first().map(|m| m.id.as_str())
    }
}

/// Error envelope returned with non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub fbtrace_id: Option<String>,
}

// ============================================================================
// Tests
// ============================================================================
