//! Conversation flow: greet, take a service selection, acknowledge.

mod interpreter;
pub mod menu;

pub use interpreter::{ConversationHandler, DeliverySummary, MenuDelivery, Outcome};
pub use menu::Service;
