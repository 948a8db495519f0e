//! Streaming chat core for GeoChat.
//!
//! Provides a Gemini streaming client and a conversation reconciler with:
//! - Mode-selected requests (Maps & Search grounding, or plain Pro chat)
//! - Streaming (SSE) responses exposed as lazy fragment sequences
//! - Grounding metadata (map places, web sources) decoded per fragment
//! - A per-turn state machine with append-only text reconciliation
//! - Snapshot publication for renderers

pub mod conversation;
pub mod gemini;
pub mod grounding;
pub mod location;
pub mod mode;
pub mod streaming;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub use conversation::{ChatMessage, Conversation, ConversationSnapshot, TurnOutcome, TurnState};
pub use gemini::{GeminiClient, GeminiConfig};
pub use grounding::{GroundingChunk, GroundingMetadata};
pub use location::{Coordinates, LocationError, LocationProvider};
pub use mode::ChatMode;

/// Receiving half of one streamed response: a finite, non-restartable
/// sequence of fragments. The channel closing without a prior error item
/// is normal completion.
pub type FragmentReceiver = mpsc::Receiver<Result<StreamFragment, ChatError>>;

#[async_trait]
pub trait StreamClient: Send + Sync {
    /// Open one streaming turn against the backend.
    ///
    /// A failed handshake is the `Err` return; a failure mid-stream is
    /// delivered as an `Err` item on the receiver, after which the
    /// sequence ends. Cancelling the token makes the client stop
    /// consuming the backend stream early.
    async fn open_stream(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentReceiver, ChatError>;
}

/// One streaming turn: the new message plus everything the backend needs
/// to answer it.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub message: String,
    /// Prior turns, oldest first. Never mutated by the client.
    pub history: Vec<HistoryTurn>,
    pub mode: ChatMode,
    /// Retrieval bias for local results, applied in Maps mode only.
    pub location: Option<Coordinates>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One incremental unit of a streamed response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamFragment {
    /// Text to append to the in-progress message.
    pub text_delta: String,
    /// Grounding snapshot, when this chunk carried a non-empty one.
    pub grounding: Option<GroundingMetadata>,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Rate limited")]
    RateLimited,
    #[error("Network error: {0}")]
    NetworkError(String),
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Timeout")]
    Timeout,
}
