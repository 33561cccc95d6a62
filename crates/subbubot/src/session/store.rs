//! Session store trait and the in-memory implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// What the bot is waiting for from a sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PendingState {
    /// The service menu was sent and a selection is expected.
    AwaitingSelection,
}

/// Stored state for one sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenderSession {
    pub pending: Option<PendingState>,
    pub first_seen_at: DateTime<Utc>,
    pub last_seen_at: DateTime<Utc>,
}

impl SenderSession {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            pending: None,
            first_seen_at: now,
            last_seen_at: now,
        }
    }

    pub fn is_awaiting_selection(&self) -> bool {
        self.pending == Some(PendingState::AwaitingSelection)
    }
}

/// Storage for sender sessions, keyed by sender phone number.
///
/// Callers serialize access per sender (see [`super::SenderLocks`]); the store
/// itself only has to be safe for concurrent use across senders.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Session for `sender`, or `None` if the sender was never seen.
    async fn get(&self, sender: &str) -> Option<SenderSession>;

    /// Record that `sender` has been seen, creating the session if needed.
    async fn mark_seen(&self, sender: &str);

    /// Set the pending state, replacing any previous one.
    async fn set_pending(&self, sender: &str, state: PendingState);

    /// Clear the pending state. The sender stays seen.
    async fn clear_pending(&self, sender: &str);

    /// Number of senders seen.
    async fn len(&self) -> usize;
}

/// Process-local store backed by a [`DashMap`].
#[derive(Debug, Default)]
pub struct InMemorySessionStore {
    sessions: DashMap<String, SenderSession>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, sender: &str) -> Option<SenderSession> {
        self.sessions.get(sender).map(|entry| entry.value().clone())
    }

    async fn mark_seen(&self, sender: &str) {
        let now = Utc::now();
        self.sessions
            .entry(sender.to_string())
            .and_modify(|session| session.last_seen_at = now)
            .or_insert_with(|| SenderSession::new(now));
    }

    async fn set_pending(&self, sender: &str, state: PendingState) {
        let now = Utc::now();
        let mut session = self
            .sessions
            .entry(sender.to_string())
            .or_insert_with(|| SenderSession::new(now));
        session.pending = Some(state);
        session.last_seen_at = now;
    }

    async fn clear_pending(&self, sender: &str) {
        if let Some(mut session) = self.sessions.get_mut(sender) {
            session.pending = None;
            session.last_seen_at = Utc::now();
        }
    }

    async fn len(&self) -> usize {
        self.sessions.len()
    }
}
