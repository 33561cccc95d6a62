//! Outbound WhatsApp Cloud API sender.
//!
//! The bot only talks to the platform through [`MessageSender`], so tests and
//! alternative transports can stand in for [`WhatsAppClient`].

mod client;
mod error;
mod sender;

pub use client::WhatsAppClient;
pub use error::SendError;
pub use sender::{MessageSender, SendReceipt};
