//! Send error types.

use thiserror::Error;

/// Errors that can occur when sending a WhatsApp message.
#[derive(Debug, Error)]
pub enum SendError {
    /// HTTP request failed before a response arrived
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned a non-2xx response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Credentials required for sending are missing
    #[error("whatsapp client not configured: missing {0}")]
    NotConfigured(&'static str),
}
