//! WhatsApp Cloud API wire types for SubbuBot.
//!
//! Two directions are modelled here:
//!
//! - [`inbound`]: webhook deliveries posted by the platform to `POST /webhook`.
//!   The loosely structured envelope is decoded once into typed messages so
//!   the bot never has to inspect raw JSON.
//! - [`outbound`]: payloads for the `/{phone_number_id}/messages` send API and
//!   the responses it returns.
//!
//! # Inbound shape
//!
//! ```text
//! { "object": "whatsapp_business_account",
//!   "entry": [ { "changes": [ { "value": { "messages": [ { "from": "...", "type": "text", "text": { "body": "Hi" } } ] } } ] } ] }
//! ```

pub mod inbound;
pub mod outbound;

pub use inbound::{
    ButtonReply, Change, ChangeValue, Entry, InboundMessage, InteractiveReply, MessageContent,
    ReplyRef, WebhookPayload,
};
pub use outbound::{
    ApiError, ApiErrorBody, InteractiveMessage, MediaKind, MediaObject, OutboundBody,
    OutboundMessage, ReplyButton, SendMessageResponse, TextContent,
};

/// Value of `messaging_product` on every WhatsApp request.
pub const MESSAGING_PRODUCT: &str = "whatsapp";
