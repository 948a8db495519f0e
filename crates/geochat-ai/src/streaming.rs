//! Server-Sent Events (SSE) streaming parser.
//!
//! The Gemini API streams responses as SSE when asked with `alt=sse`.
//! `SseReader` pulls one event at a time from any buffered byte source,
//! which keeps the wire framing testable without a live endpoint.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone)]
pub struct SseEvent {
    /// The event type, when the stream names one.
    pub event: Option<String>,
    /// The event data (JSON string for Gemini streams).
    pub data: String,
}

/// Pull-based SSE event reader.
pub struct SseReader<R> {
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin> SseReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
        }
    }

    /// Read the next event, or `None` at end of stream.
    ///
    /// A final event missing its terminating blank line is still
    /// delivered before `None`.
    pub async fn next_event(&mut self) -> std::io::Result<Option<SseEvent>> {
        let mut event: Option<String> = None;
        let mut data = String::new();

        while let Some(line) = self.lines.next_line().await? {
            if line.is_empty() {
                // Empty line = end of event
                if !data.is_empty() {
                    return Ok(Some(SseEvent { event, data }));
                }
                event = None;
                continue;
            }

            if let Some(event_type) = line.strip_prefix("event: ") {
                event = Some(event_type.to_string());
            } else if let Some(value) = line.strip_prefix("data: ") {
                if !data.is_empty() {
                    data.push('\n');
                }
                data.push_str(value);
            }
            // Ignore other fields (id:, retry:, comments)
        }

        // Flush a final unterminated event
        if !data.is_empty() {
            return Ok(Some(SseEvent { event, data }));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_all(input: &[u8]) -> Vec<SseEvent> {
        let mut reader = SseReader::new(input);
        let mut events = Vec::new();
        while let Some(event) = reader.next_event().await.unwrap() {
            events.push(event);
        }
        events
    }

    #[tokio::test]
    async fn single_event() {
        let events = read_all(b"data: {\"x\":1}\n\n").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "{\"x\":1}");
        assert!(events[0].event.is_none());
    }

    #[tokio::test]
    async fn named_event() {
        let events = read_all(b"event: message\ndata: hello\n\n").await;
        assert_eq!(events[0].event.as_deref(), Some("message"));
        assert_eq!(events[0].data, "hello");
    }

    #[tokio::test]
    async fn multi_line_data_joined_with_newline() {
        let events = read_all(b"data: first\ndata: second\n\n").await;
        assert_eq!(events[0].data, "first\nsecond");
    }

    #[tokio::test]
    async fn final_event_without_trailing_blank_line() {
        let events = read_all(b"data: a\n\ndata: b").await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].data, "b");
    }

    #[tokio::test]
    async fn ignores_comments_and_other_fields() {
        let events = read_all(b": keepalive\nid: 7\nretry: 100\ndata: real\n\n").await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].data, "real");
    }

    #[tokio::test]
    async fn blank_lines_without_data_emit_nothing() {
        let events = read_all(b"\n\nevent: ping\n\n").await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn consecutive_events_keep_order() {
        let events = read_all(b"data: one\n\ndata: two\n\ndata: three\n\n").await;
        let datas: Vec<_> = events.iter().map(|e| e.data.as_str()).collect();
        assert_eq!(datas, ["one", "two", "three"]);
    }
}
