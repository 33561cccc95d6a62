//! Per-sender conversation state.
//!
//! A sender that has never written in has no session at all. Once seen, a
//! session may carry a single [`PendingState`]. Sessions live only as long
//! as the store backing them; the in-memory store loses them on restart.

mod locks;
mod store;

pub use locks::{SenderGuard, SenderLocks};
pub use store::{InMemorySessionStore, PendingState, SenderSession, SessionStore};
