//! Shared fakes for unit tests.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;
use subbubot_protocol::{InboundMessage, OutboundBody, OutboundMessage};

use crate::whatsapp::{MessageSender, SendError, SendReceipt};

/// Records accepted sends; rejects sends by message kind or recipient.
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<OutboundMessage>>,
    failing_kinds: Mutex<HashSet<&'static str>>,
    failing_recipients: Mutex<HashSet<String>>,
}

impl RecordingSender {
    pub fn failing(kinds: &[&'static str]) -> Self {
        let sender = Self::default();
        for kind in kinds {
            sender.fail_kind(*kind);
        }
        sender
    }

    pub fn fail_kind(&self, kind: &'static str) {
        self.failing_kinds.lock().unwrap().insert(kind);
    }

    pub fn fail_recipient(&self, to: &str) {
        self.failing_recipients.lock().unwrap().insert(to.to_string());
    }

    pub fn sent(&self) -> Vec<OutboundMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.sent().iter().map(OutboundMessage::kind).collect()
    }

    /// Bodies of sent text messages.
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|m| match m.body {
                OutboundBody::Text { text } => Some(text.body),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send(&self, message: OutboundMessage) -> Result<SendReceipt, SendError> {
        let rejected = self.failing_kinds.lock().unwrap().contains(message.kind())
            || self.failing_recipients.lock().unwrap().contains(&message.to);
        if rejected {
            return Err(SendError::Api {
                status: 500,
                message: "simulated failure".to_string(),
            });
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(message);
        Ok(SendReceipt {
            status: 200,
            message_id: Some(format!("wamid.test{}", sent.len())),
        })
    }
}

/// Decode one message in its wire form.
pub fn message(value: serde_json::Value) -> InboundMessage {
    serde_json::from_value(value).unwrap()
}

pub fn text_message(from: &str, body: &str) -> InboundMessage {
    message(json!({
        "from": from,
        "id": "wamid.in",
        "timestamp": "1700000000",
        "type": "text",
        "text": { "body": body }
    }))
}
