//! Conversation struct and state accessors.

use std::sync::atomic::AtomicBool;

use tokio::sync::watch;

use crate::grounding::GroundingMetadata;
use crate::location::Coordinates;
use crate::mode::ChatMode;

use super::types::{ChatMessage, ConversationSnapshot, TurnState};

/// A conversation: ordered messages plus the state of the current turn.
///
/// Mutation happens only through `submit` and the setters below; readers
/// take value snapshots, either directly or through `subscribe`.
pub struct Conversation {
    /// Ordered message history, insertion order is display order.
    pub(super) messages: Vec<ChatMessage>,
    /// Mode applied to the next submitted turn.
    pub(super) mode: ChatMode,
    /// Retrieval bias attached to Maps-mode requests.
    pub(super) location: Option<Coordinates>,
    /// State of the most recent turn.
    pub(super) turn: TurnState,
    /// Latest non-empty grounding snapshot adopted in any turn.
    pub(super) active_grounding: Option<GroundingMetadata>,
    /// Snapshot publication channel for renderers.
    pub(super) snapshots: watch::Sender<ConversationSnapshot>,
    /// Whether a turn is currently in flight.
    pub(super) busy: AtomicBool,
}

impl Conversation {
    pub fn new(mode: ChatMode) -> Self {
        let initial = ConversationSnapshot {
            messages: Vec::new(),
            mode,
            turn: TurnState::Idle,
            active_grounding: None,
        };
        let (snapshots, _) = watch::channel(initial);
        Self {
            messages: Vec::new(),
            mode,
            location: None,
            turn: TurnState::Idle,
            active_grounding: None,
            snapshots,
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_location(mut self, location: Option<Coordinates>) -> Self {
        self.location = location;
        self
    }

    /// Switch modes for subsequent turns. Past messages are untouched.
    pub fn select_mode(&mut self, mode: ChatMode) {
        self.mode = mode;
        self.publish();
    }

    pub fn set_location(&mut self, location: Option<Coordinates>) {
        self.location = location;
    }

    pub fn mode(&self) -> ChatMode {
        self.mode
    }

    pub fn location(&self) -> Option<Coordinates> {
        self.location
    }

    pub fn turn(&self) -> TurnState {
        self.turn
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    pub fn active_grounding(&self) -> Option<&GroundingMetadata> {
        self.active_grounding.as_ref()
    }

    /// Value snapshot of the whole conversation.
    pub fn snapshot(&self) -> ConversationSnapshot {
        ConversationSnapshot {
            messages: self.messages.clone(),
            mode: self.mode,
            turn: self.turn,
            active_grounding: self.active_grounding.clone(),
        }
    }

    /// Watch snapshots as they are published.
    pub fn subscribe(&self) -> watch::Receiver<ConversationSnapshot> {
        self.snapshots.subscribe()
    }

    /// Drop all messages and start over in the current mode.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.turn = TurnState::Idle;
        self.active_grounding = None;
        self.publish();
    }

    pub(super) fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_empty() {
        let convo = Conversation::new(ChatMode::MapsAndSearch);
        assert_eq!(convo.turn(), TurnState::Idle);
        assert_eq!(convo.message_count(), 0);
        assert!(convo.active_grounding().is_none());
        assert_eq!(convo.mode(), ChatMode::MapsAndSearch);
    }

    #[test]
    fn select_mode_publishes_a_snapshot() {
        let mut convo = Conversation::new(ChatMode::MapsAndSearch);
        let mut rx = convo.subscribe();
        assert!(!rx.has_changed().unwrap());

        convo.select_mode(ChatMode::ProChat);
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().mode, ChatMode::ProChat);
        assert_eq!(convo.mode(), ChatMode::ProChat);
    }

    #[test]
    fn location_builder_and_setter() {
        let position = Coordinates {
            latitude: 48.85,
            longitude: 2.35,
        };
        let mut convo = Conversation::new(ChatMode::MapsAndSearch).with_location(Some(position));
        assert_eq!(convo.location(), Some(position));

        convo.set_location(None);
        assert!(convo.location().is_none());
    }

    #[test]
    fn clear_resets_turn_and_grounding() {
        let mut convo = Conversation::new(ChatMode::ProChat);
        convo.messages.push(ChatMessage::user("hi".into()));
        convo.turn = TurnState::Sealed;

        convo.clear();
        assert_eq!(convo.message_count(), 0);
        assert_eq!(convo.turn(), TurnState::Idle);
        assert!(convo.active_grounding().is_none());
        assert!(convo.subscribe().borrow().messages.is_empty());
    }
}
