//! SubbuBot - a WhatsApp webhook bot that greets senders, offers a service
//! menu, and confirms the selection.

pub mod config;
pub mod conversation;
pub mod handlers;
pub mod server;
pub mod session;
pub mod whatsapp;

#[cfg(test)]
mod test_support;
