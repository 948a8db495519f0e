//! Async turn driving for Conversation (submit + stream reconciliation).

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::{ChatRequest, HistoryTurn, StreamClient};

use super::manager::Conversation;
use super::types::{ChatMessage, IgnoreReason, TurnGuard, TurnOutcome, TurnState};

/// Fixed text shown in place of a reply when the stream fails.
pub const STREAM_ERROR_TEXT: &str = "**Error:** Failed to get response. Please try again.";

impl Conversation {
    /// Submit one user turn and drive it to a terminal state.
    ///
    /// Appends the user message and a streaming placeholder, opens the
    /// stream, and reconciles fragments into the placeholder until the
    /// sequence ends, errors, or the token is cancelled. Blank input and
    /// an already in-flight turn are silent no-ops.
    pub async fn submit(
        &mut self,
        client: &dyn StreamClient,
        user_text: impl Into<String>,
        cancel: CancellationToken,
    ) -> TurnOutcome {
        let user_text = user_text.into();
        if user_text.trim().is_empty() {
            return TurnOutcome::Ignored(IgnoreReason::EmptyInput);
        }

        let Some(_guard) = TurnGuard::acquire(&self.busy) else {
            debug!("submit ignored, turn already in flight");
            return TurnOutcome::Ignored(IgnoreReason::Busy);
        };

        // A submit future dropped mid-stream leaves its placeholder open.
        // Seal it as cancelled before starting the next turn.
        if let Some(last) = self.messages.last_mut() {
            if last.is_streaming {
                debug!("sealing placeholder abandoned by a dropped turn");
                last.is_streaming = false;
                self.turn = TurnState::Cancelled;
            }
        }

        let mode = self.mode;
        let history: Vec<HistoryTurn> = self
            .messages
            .iter()
            .map(|message| HistoryTurn {
                role: message.role,
                text: message.text.clone(),
            })
            .collect();

        self.messages.push(ChatMessage::user(user_text.clone()));
        self.messages.push(ChatMessage::placeholder());
        let placeholder = self.messages.len() - 1;
        self.turn = TurnState::Sending;
        self.publish();

        let request = ChatRequest {
            message: user_text,
            history,
            mode,
            location: self.location,
        };

        debug!(mode = ?mode, "submitting turn");

        let opened = tokio::select! {
            biased;
            _ = cancel.cancelled() => None,
            result = client.open_stream(request, cancel.clone()) => Some(result),
        };

        let mut rx = match opened {
            Some(Ok(rx)) => rx,
            Some(Err(err)) => {
                warn!(error = %err, "stream open failed");
                let message = &mut self.messages[placeholder];
                message.text = STREAM_ERROR_TEXT.to_string();
                message.is_streaming = false;
                self.turn = TurnState::Failed;
                self.publish();
                return TurnOutcome::Failed;
            }
            None => {
                debug!("turn cancelled before the stream opened");
                self.messages[placeholder].is_streaming = false;
                self.turn = TurnState::Cancelled;
                self.publish();
                return TurnOutcome::Cancelled;
            }
        };

        loop {
            let item = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("turn cancelled mid-stream");
                    self.messages[placeholder].is_streaming = false;
                    self.turn = TurnState::Cancelled;
                    self.publish();
                    return TurnOutcome::Cancelled;
                }
                item = rx.recv() => item,
            };

            match item {
                Some(Ok(fragment)) => {
                    if self.turn == TurnState::Sending {
                        self.turn = TurnState::Streaming;
                    }
                    let message = &mut self.messages[placeholder];
                    message.text.push_str(&fragment.text_delta);
                    // Adopt only non-empty snapshots, wholesale: the latest
                    // one wins, an empty one never erases an earlier one.
                    if let Some(snapshot) = fragment.grounding {
                        if !snapshot.chunks.is_empty() {
                            message.grounding = Some(snapshot.clone());
                            self.active_grounding = Some(snapshot);
                        }
                    }
                    self.publish();
                }
                Some(Err(err)) => {
                    warn!(error = %err, "stream interrupted");
                    let message = &mut self.messages[placeholder];
                    message.text = STREAM_ERROR_TEXT.to_string();
                    message.is_streaming = false;
                    self.turn = TurnState::Failed;
                    self.publish();
                    return TurnOutcome::Failed;
                }
                None => {
                    let message = &mut self.messages[placeholder];
                    message.is_streaming = false;
                    debug!(chars = message.text.len(), "turn sealed");
                    self.turn = TurnState::Sealed;
                    self.publish();
                    return TurnOutcome::Sealed;
                }
            }
        }
    }
}
