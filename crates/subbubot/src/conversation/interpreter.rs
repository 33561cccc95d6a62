//! Inbound message interpreter.
//!
//! Per sender the bot moves through three states:
//!
//! ```text
//!   NEW ──any message──▶ AWAITING_SELECTION ──valid choice──▶ IDLE
//!                          │    ▲                              │
//!                          │    └──────── greeting ────────────┘
//!                          └─ invalid choice: re-prompt, stay
//! ```
//!
//! `NEW` is the absence of a session; `IDLE` is a session without a pending
//! state. A greeting restarts the welcome flow from any state.

use std::sync::Arc;

use subbubot_protocol::{InboundMessage, WebhookPayload};
use tracing::{debug, error, info, warn};

use super::menu::{
    ACKNOWLEDGEMENT_TEXT, REPROMPT_TEXT, Service, WELCOME_TEXT_MENU, is_greeting, service_menu,
};
use crate::config::WelcomeConfig;
use crate::session::{PendingState, SenderLocks, SessionStore};
use crate::whatsapp::{MessageSender, SendError};

/// How the service menu reached the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuDelivery {
    Interactive,
    /// The interactive send failed and the plain-text menu went out instead.
    TextFallback,
}

/// Result of handling one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No sender id; nothing was sent.
    Skipped,
    Welcomed(MenuDelivery),
    Selected(Service),
    Reprompted,
    Acknowledged,
}

/// Per-delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliverySummary {
    pub handled: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Drives the welcome / selection / acknowledgement flow.
#[derive(Clone)]
pub struct ConversationHandler {
    sender: Arc<dyn MessageSender>,
    sessions: Arc<dyn SessionStore>,
    locks: SenderLocks,
    welcome: WelcomeConfig,
}

impl ConversationHandler {
    pub fn new(
        sender: Arc<dyn MessageSender>,
        sessions: Arc<dyn SessionStore>,
        welcome: WelcomeConfig,
    ) -> Self {
        Self {
            sender,
            sessions,
            locks: SenderLocks::new(),
            welcome,
        }
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    /// Handle every message of a delivery in arrival order.
    ///
    /// A message that fails is logged and counted; the rest still run.
    pub async fn handle_delivery(&self, payload: &WebhookPayload) -> DeliverySummary {
        let mut summary = DeliverySummary::default();

        for message in payload.messages() {
            match self.handle_message(message).await {
                Ok(Outcome::Skipped) => {
                    summary.skipped += 1;
                    debug!(message_id = ?message.id, "Skipping message without sender");
                }
                Ok(_) => summary.handled += 1,
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        from = message.sender().unwrap_or("-"),
                        kind = message.kind(),
                        error = %e,
                        "Failed to handle message"
                    );
                }
            }
        }

        summary
    }

    /// Handle a single message while holding its sender's lock.
    pub async fn handle_message(&self, message: &InboundMessage) -> Result<Outcome, SendError> {
        let Some(from) = message.sender() else {
            return Ok(Outcome::Skipped);
        };

        let _guard = self.locks.acquire(from).await;
        let text = message.text();

        debug!(
            from = %from,
            kind = message.kind(),
            received_at = ?message.received_at(),
            "Handling message"
        );

        let awaiting = match self.sessions.get(from).await {
            Some(session) if !is_greeting(text) => session.is_awaiting_selection(),
            _ => {
                let delivery = self.send_welcome(from).await?;
                self.sessions.mark_seen(from).await;
                self.sessions
                    .set_pending(from, PendingState::AwaitingSelection)
                    .await;
                info!(from = %from, menu = ?delivery, "Welcomed sender");
                return Ok(Outcome::Welcomed(delivery));
            }
        };

        if !awaiting {
            self.sender.send_text(from, ACKNOWLEDGEMENT_TEXT).await?;
            return Ok(Outcome::Acknowledged);
        }

        let choice = message.reply_token().unwrap_or(text);
        match Service::from_choice(choice) {
            Some(service) => {
                self.sender.send_text(from, service.confirmation()).await?;
                self.sessions.clear_pending(from).await;
                info!(from = %from, service = service.label(), "Service selected");
                Ok(Outcome::Selected(service))
            }
            None => {
                self.sender.send_text(from, REPROMPT_TEXT).await?;
                debug!(from = %from, choice = %choice, "Unrecognized selection");
                Ok(Outcome::Reprompted)
            }
        }
    }

    /// Welcome media (best effort), then the service menu.
    async fn send_welcome(&self, to: &str) -> Result<MenuDelivery, SendError> {
        if let Some(url) = self.welcome.media_url.as_deref().filter(|u| !u.is_empty())
            && let Err(e) = self
                .sender
                .send_media(to, self.welcome.media_kind, url, self.welcome.caption.as_deref())
                .await
        {
            warn!(to = %to, error = %e, "Failed to send welcome media");
        }

        match self.sender.send_interactive(to, service_menu()).await {
            Ok(_) => Ok(MenuDelivery::Interactive),
            Err(e) => {
                warn!(to = %to, error = %e, "Failed to send interactive menu, falling back to text menu");
                self.sender.send_text(to, WELCOME_TEXT_MENU).await?;
                Ok(MenuDelivery::TextFallback)
            }
        }
    }
}
