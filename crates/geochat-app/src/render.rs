//! Terminal rendering: streamed text as it grows, and the Sources panel.

use std::io::Write;

use tokio::sync::watch;

use geochat_ai::{ConversationSnapshot, GroundingChunk, GroundingMetadata, TurnState};

const REVIEW_PREVIEW_CHARS: usize = 80;

/// Print the streaming reply as snapshots arrive, ending with the turn.
///
/// Text is append-only while streaming, so each snapshot is rendered by
/// printing the suffix past what was already written. A failed turn
/// replaces the text wholesale; the fixed error message is printed on
/// its own line instead of diffed.
pub async fn print_turn(rx: &mut watch::Receiver<ConversationSnapshot>) -> TurnState {
    let mut printed = 0usize;
    loop {
        if rx.changed().await.is_err() {
            return TurnState::Idle;
        }
        let (turn, text) = {
            let snapshot = rx.borrow_and_update();
            let text = snapshot
                .messages
                .last()
                .map(|message| message.text.clone())
                .unwrap_or_default();
            (snapshot.turn, text)
        };
        match turn {
            TurnState::Failed => {
                if printed > 0 {
                    println!();
                }
                println!("{text}");
                return turn;
            }
            TurnState::Sending | TurnState::Streaming | TurnState::Sealed
            | TurnState::Cancelled => {
                if text.len() > printed {
                    print!("{}", &text[printed..]);
                    let _ = std::io::stdout().flush();
                    printed = text.len();
                }
                if turn == TurnState::Sealed || turn == TurnState::Cancelled {
                    println!();
                    if turn == TurnState::Cancelled {
                        println!("(cancelled)");
                    }
                    return turn;
                }
            }
            TurnState::Idle => {}
        }
    }
}

/// Render the Sources panel: map places first, then web results.
pub fn format_sources(grounding: &GroundingMetadata) -> String {
    let mut places = Vec::new();
    let mut web = Vec::new();
    for chunk in &grounding.chunks {
        match chunk {
            GroundingChunk::MapPlace(place) => places.push(place),
            GroundingChunk::Web(source) => web.push(source),
        }
    }

    let mut out = format!("Sources ({})\n", grounding.chunks.len());
    if !places.is_empty() {
        out.push_str("  Map places:\n");
        for place in places {
            let title = place.title.as_deref().unwrap_or("Unnamed place");
            out.push_str(&format!("   • {title}\n"));
            if let Some(snippet) = place.review_snippets.first() {
                let preview = truncate_chars(&snippet.content, REVIEW_PREVIEW_CHARS);
                out.push_str(&format!("     \"{preview}\" — {}\n", snippet.author));
            }
            if let Some(uri) = &place.uri {
                out.push_str(&format!("     {uri}\n"));
            }
        }
    }
    if !web.is_empty() {
        out.push_str("  Web:\n");
        for source in web {
            out.push_str(&format!(
                "   • {} ({})\n     {}\n",
                source.title,
                hostname(&source.uri),
                source.uri
            ));
        }
    }
    out
}

/// Hostname of a URI, for the compact web-result line.
fn hostname(uri: &str) -> &str {
    let rest = uri
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(uri);
    rest.split(['/', '?', '#']).next().unwrap_or(rest)
}

/// Cut at a character count, never inside a code point.
fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let cut: String = text.chars().take(limit).collect();
    format!("{}…", cut.trim_end())
}
