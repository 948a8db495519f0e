//! Conversation reconciliation.
//!
//! A `Conversation` owns the canonical message list and drives one
//! streaming turn at a time through a small state machine, publishing an
//! immutable snapshot after every transition.

mod chat;
mod manager;
mod types;

pub use chat::STREAM_ERROR_TEXT;
pub use manager::Conversation;
pub use types::{
    ChatMessage, ConversationSnapshot, IgnoreReason, MessageId, TurnOutcome, TurnState,
};
