//! Sender trait.

use async_trait::async_trait;
use subbubot_protocol::{InteractiveMessage, MediaKind, OutboundMessage};

use super::error::SendError;

/// Outcome of an accepted send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReceipt {
    /// HTTP status returned by the platform.
    pub status: u16,
    /// `wamid.*` id assigned to the message, when the response carried one.
    pub message_id: Option<String>,
}

/// Something that can deliver outbound messages to a WhatsApp user.
///
/// One call is one attempt; implementations do not retry.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<SendReceipt, SendError>;

    async fn send_text(&self, to: &str, body: &str) -> Result<SendReceipt, SendError> {
        self.send(OutboundMessage::text(to, body)).await
    }

    async fn send_media(
        &self,
        to: &str,
        kind: MediaKind,
        link: &str,
        caption: Option<&str>,
    ) -> Result<SendReceipt, SendError> {
        self.send(OutboundMessage::media(
            to,
            kind,
            link,
            caption.map(str::to_string),
        ))
        .await
    }

    async fn send_interactive(
        &self,
        to: &str,
        interactive: InteractiveMessage,
    ) -> Result<SendReceipt, SendError> {
        self.send(OutboundMessage::interactive(to, interactive)).await
    }
}
