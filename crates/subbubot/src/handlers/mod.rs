//! HTTP request handlers.

mod health;
mod webhook;

pub use health::{livez, readyz, root};
pub use webhook::{ReceivedResponse, VerifyParams, receive_webhook, verify_webhook};
