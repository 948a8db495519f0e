//! StreamClient trait implementation for GeminiClient.

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use tokio_util::io::StreamReader;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::grounding::decode_grounding;
use crate::streaming::SseReader;
use crate::{ChatError, ChatRequest, FragmentReceiver, StreamClient, StreamFragment};

use super::client::GeminiClient;

const FRAGMENT_CHANNEL_CAPACITY: usize = 100;

#[async_trait]
impl StreamClient for GeminiClient {
    async fn open_stream(
        &self,
        request: ChatRequest,
        cancel: CancellationToken,
    ) -> Result<FragmentReceiver, ChatError> {
        let body = self.build_request_body(&request);
        let url = format!("{}?alt=sse", self.api_url(request.mode));

        debug!(
            model = %self.config.model_for(request.mode),
            turns = request.history.len(),
            "Gemini API streaming request"
        );

        let response = self
            .http
            .post(&url)
            .header("content-type", "application/json")
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Timeout
                } else {
                    ChatError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(ChatError::RateLimited);
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::ApiError(format!("HTTP {status}: {text}")));
        }

        let (tx, rx) = mpsc::channel(FRAGMENT_CHANNEL_CAPACITY);
        tokio::spawn(async move {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("Gemini stream cancelled, dropping connection");
                }
                result = forward_fragments(response, &tx) => {
                    if let Err(err) = result {
                        warn!(error = %err, "Gemini stream failed mid-response");
                        let _ = tx.send(Err(err)).await;
                    }
                }
            }
        });

        Ok(rx)
    }
}

/// Consume the SSE response and forward one fragment per decodable chunk.
/// Stops quietly once the receiver is dropped.
async fn forward_fragments(
    response: reqwest::Response,
    tx: &mpsc::Sender<Result<StreamFragment, ChatError>>,
) -> Result<(), ChatError> {
    let byte_stream = response
        .bytes_stream()
        .map(|result| result.map_err(std::io::Error::other));
    let mut events = SseReader::new(BufReader::new(StreamReader::new(byte_stream)));

    while let Some(event) = events
        .next_event()
        .await
        .map_err(|e| ChatError::NetworkError(e.to_string()))?
    {
        let Some(fragment) = decode_fragment(&event.data) else {
            continue;
        };
        if tx.send(Ok(fragment)).await.is_err() {
            break;
        }
    }
    Ok(())
}

/// Decode one SSE data payload into a fragment.
///
/// Follows the first candidate only. Returns `None` for undecodable
/// payloads and for chunks carrying neither text nor grounding.
fn decode_fragment(data: &str) -> Option<StreamFragment> {
    let json: serde_json::Value = serde_json::from_str(data).ok()?;
    let candidate = json["candidates"].as_array()?.first()?;

    let mut text_delta = String::new();
    if let Some(parts) = candidate["content"]["parts"].as_array() {
        for part in parts {
            if let Some(text) = part["text"].as_str() {
                text_delta.push_str(text);
            }
        }
    }

    let grounding = decode_grounding(&candidate["groundingMetadata"]);
    if text_delta.is_empty() && grounding.is_none() {
        return None;
    }
    Some(StreamFragment {
        text_delta,
        grounding,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grounding::GroundingChunk;

    #[test]
    fn text_parts_concatenate() {
        let fragment = decode_fragment(
            r#"{"candidates":[{"content":{"parts":[{"text":"Le"},{"text":" Petit"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(fragment.text_delta, "Le Petit");
        assert!(fragment.grounding.is_none());
    }

    #[test]
    fn grounding_rides_along_with_text() {
        let fragment = decode_fragment(
            r#"{"candidates":[{
                "content":{"parts":[{"text":" Café"}]},
                "groundingMetadata":{"groundingChunks":[{"maps":{"title":"Le Petit Café"}}]}
            }]}"#,
        )
        .unwrap();
        assert_eq!(fragment.text_delta, " Café");
        let metadata = fragment.grounding.unwrap();
        assert!(matches!(metadata.chunks[0], GroundingChunk::MapPlace(_)));
    }

    #[test]
    fn empty_grounding_is_dropped() {
        let fragment = decode_fragment(
            r#"{"candidates":[{
                "content":{"parts":[{"text":"hi"}]},
                "groundingMetadata":{"groundingChunks":[]}
            }]}"#,
        )
        .unwrap();
        assert_eq!(fragment.text_delta, "hi");
        assert!(fragment.grounding.is_none());
    }

    #[test]
    fn chunk_without_text_or_grounding_is_skipped() {
        assert!(decode_fragment(r#"{"candidates":[{"finishReason":"STOP"}]}"#).is_none());
        assert!(decode_fragment(r#"{"usageMetadata":{"promptTokenCount":3}}"#).is_none());
    }

    #[test]
    fn undecodable_payload_is_skipped() {
        assert!(decode_fragment("not json").is_none());
    }

    #[test]
    fn first_candidate_wins() {
        let fragment = decode_fragment(
            r#"{"candidates":[
                {"content":{"parts":[{"text":"first"}]}},
                {"content":{"parts":[{"text":"second"}]}}
            ]}"#,
        )
        .unwrap();
        assert_eq!(fragment.text_delta, "first");
    }
}
