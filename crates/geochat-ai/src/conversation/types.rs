//! Conversation types and the turn concurrency guard.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};

use crate::grounding::GroundingMetadata;
use crate::mode::ChatMode;
use crate::Role;

/// Unique message identity within a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One entry in the conversation record.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub created_at: DateTime<Utc>,
    /// True only while this message is the turn's open placeholder.
    pub is_streaming: bool,
    pub grounding: Option<GroundingMetadata>,
}

impl ChatMessage {
    pub(super) fn user(text: String) -> Self {
        Self {
            id: MessageId::new(),
            role: Role::User,
            text,
            created_at: Utc::now(),
            is_streaming: false,
            grounding: None,
        }
    }

    /// Empty model message for the stream to fill in.
    pub(super) fn placeholder() -> Self {
        Self {
            id: MessageId::new(),
            role: Role::Model,
            text: String::new(),
            created_at: Utc::now(),
            is_streaming: true,
            grounding: None,
        }
    }
}

/// Where the most recent turn stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    /// Request sent, no fragment seen yet.
    Sending,
    /// At least one fragment consumed.
    Streaming,
    Sealed,
    Failed,
    Cancelled,
}

/// What `submit` did with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOutcome {
    Sealed,
    Failed,
    Cancelled,
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    EmptyInput,
    Busy,
}

/// Immutable view of the conversation, published after every transition.
#[derive(Debug, Clone)]
pub struct ConversationSnapshot {
    pub messages: Vec<ChatMessage>,
    pub mode: ChatMode,
    pub turn: TurnState,
    /// Latest non-empty grounding adopted in any turn.
    pub active_grounding: Option<GroundingMetadata>,
}

/// Guard that clears the `busy` flag on drop, ensuring it is always
/// released even if the turn future is dropped mid-stream.
pub(crate) struct TurnGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> TurnGuard<'a> {
    /// Attempt to mark a turn in flight. `None` means one already is.
    pub(crate) fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
            .then_some(Self { flag })
    }
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guard_is_exclusive_until_dropped() {
        let flag = AtomicBool::new(false);

        let guard = TurnGuard::acquire(&flag).unwrap();
        assert!(TurnGuard::acquire(&flag).is_none());

        drop(guard);
        assert!(TurnGuard::acquire(&flag).is_some());
    }

    #[test]
    fn message_ids_are_unique() {
        let a = ChatMessage::user("hi".into());
        let b = ChatMessage::user("hi".into());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn placeholder_starts_open_and_empty() {
        let message = ChatMessage::placeholder();
        assert!(message.is_streaming);
        assert!(message.text.is_empty());
        assert!(message.grounding.is_none());
        assert_eq!(message.role, Role::Model);
    }
}
