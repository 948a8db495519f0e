//! Grounding metadata: the evidence a response is backed by.
//!
//! Maps-mode answers arrive with grounding chunks naming the map places
//! and web pages the model consulted. The wire shape is loose (optional
//! everything, nested source configs); this module decodes it into a
//! closed model where every chunk is exactly one source kind and a
//! metadata value always holds at least one chunk.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingMetadata {
    pub chunks: Vec<GroundingChunk>,
    /// Pre-rendered search suggestion block, when the backend sent one.
    pub search_entry_point: Option<SearchEntryPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GroundingChunk {
    Web(WebSource),
    MapPlace(MapPlaceSource),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSource {
    pub uri: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapPlaceSource {
    pub uri: Option<String>,
    pub title: Option<String>,
    pub place_id: Option<String>,
    pub review_snippets: Vec<ReviewSnippet>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSnippet {
    pub content: String,
    pub author: String,
    pub source_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEntryPoint {
    pub rendered_content: String,
}

/// Decode the `groundingMetadata` value of a response candidate.
///
/// Returns `None` for absent, malformed, or empty metadata — an empty
/// chunk list never becomes a metadata value.
pub(crate) fn decode_grounding(value: &serde_json::Value) -> Option<GroundingMetadata> {
    if value.is_null() {
        return None;
    }
    let wire: WireGroundingMetadata = serde_json::from_value(value.clone()).ok()?;
    GroundingMetadata::from_wire(wire)
}

impl GroundingMetadata {
    fn from_wire(wire: WireGroundingMetadata) -> Option<Self> {
        let chunks: Vec<GroundingChunk> = wire
            .grounding_chunks
            .into_iter()
            .filter_map(GroundingChunk::from_wire)
            .collect();
        if chunks.is_empty() {
            return None;
        }
        let search_entry_point = wire
            .search_entry_point
            .and_then(|entry| entry.rendered_content)
            .map(|rendered_content| SearchEntryPoint { rendered_content });
        Some(Self {
            chunks,
            search_entry_point,
        })
    }
}

impl GroundingChunk {
    // A chunk carries one source kind; maps wins if the wire ever sets both.
    fn from_wire(wire: WireChunk) -> Option<Self> {
        if let Some(maps) = wire.maps {
            let place_id = maps.place_id.or_else(|| {
                maps.source_config
                    .and_then(|config| config.google_maps_source_config)
                    .and_then(|config| config.place_id)
            });
            let review_snippets = maps
                .place_answer_sources
                .map(|sources| sources.review_snippets)
                .unwrap_or_default()
                .into_iter()
                .map(|snippet| ReviewSnippet {
                    content: snippet.content,
                    author: snippet.author,
                    source_uri: snippet.source_uri,
                })
                .collect();
            return Some(Self::MapPlace(MapPlaceSource {
                uri: maps.uri,
                title: maps.title,
                place_id,
                review_snippets,
            }));
        }
        if let Some(web) = wire.web {
            return Some(Self::Web(WebSource {
                uri: web.uri,
                title: web.title,
            }));
        }
        None
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireGroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<WireChunk>,
    search_entry_point: Option<WireSearchEntryPoint>,
}

#[derive(Debug, Default, Deserialize)]
struct WireChunk {
    web: Option<WireWebSource>,
    maps: Option<WireMapsSource>,
}

#[derive(Debug, Deserialize)]
struct WireWebSource {
    #[serde(default)]
    uri: String,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMapsSource {
    uri: Option<String>,
    title: Option<String>,
    place_id: Option<String>,
    source_config: Option<WireSourceConfig>,
    place_answer_sources: Option<WirePlaceAnswerSources>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSourceConfig {
    google_maps_source_config: Option<WireMapsSourceConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireMapsSourceConfig {
    place_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WirePlaceAnswerSources {
    #[serde(default)]
    review_snippets: Vec<WireReviewSnippet>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireReviewSnippet {
    #[serde(default)]
    content: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    source_uri: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSearchEntryPoint {
    rendered_content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn web_chunk_decodes() {
        let value = json!({
            "groundingChunks": [
                { "web": { "uri": "https://example.com/cafes", "title": "Best cafes" } }
            ]
        });

        let metadata = decode_grounding(&value).unwrap();
        assert_eq!(metadata.chunks.len(), 1);
        match &metadata.chunks[0] {
            GroundingChunk::Web(web) => {
                assert_eq!(web.uri, "https://example.com/cafes");
                assert_eq!(web.title, "Best cafes");
            }
            other => panic!("expected web chunk, got {other:?}"),
        }
    }

    #[test]
    fn map_place_with_reviews_decodes() {
        let value = json!({
            "groundingChunks": [{
                "maps": {
                    "uri": "https://maps.google.com/?cid=42",
                    "title": "Le Petit Café",
                    "placeId": "ChIJabc123",
                    "placeAnswerSources": {
                        "reviewSnippets": [{
                            "content": "Great espresso, tiny terrace.",
                            "author": "A local guide",
                            "sourceUri": "https://maps.google.com/review/1"
                        }]
                    }
                }
            }]
        });

        let metadata = decode_grounding(&value).unwrap();
        match &metadata.chunks[0] {
            GroundingChunk::MapPlace(place) => {
                assert_eq!(place.title.as_deref(), Some("Le Petit Café"));
                assert_eq!(place.place_id.as_deref(), Some("ChIJabc123"));
                assert_eq!(place.review_snippets.len(), 1);
                assert_eq!(place.review_snippets[0].author, "A local guide");
                assert_eq!(
                    place.review_snippets[0].source_uri,
                    "https://maps.google.com/review/1"
                );
            }
            other => panic!("expected map place, got {other:?}"),
        }
    }

    #[test]
    fn place_id_falls_back_to_source_config() {
        let value = json!({
            "groundingChunks": [{
                "maps": {
                    "title": "Musée d'Orsay",
                    "sourceConfig": {
                        "googleMapsSourceConfig": { "placeId": "ChIJnested" }
                    }
                }
            }]
        });

        let metadata = decode_grounding(&value).unwrap();
        match &metadata.chunks[0] {
            GroundingChunk::MapPlace(place) => {
                assert_eq!(place.place_id.as_deref(), Some("ChIJnested"));
                assert!(place.uri.is_none());
                assert!(place.review_snippets.is_empty());
            }
            other => panic!("expected map place, got {other:?}"),
        }
    }

    #[test]
    fn empty_chunk_list_is_no_metadata() {
        let value = json!({ "groundingChunks": [] });
        assert!(decode_grounding(&value).is_none());
    }

    #[test]
    fn absent_value_is_no_metadata() {
        assert!(decode_grounding(&serde_json::Value::Null).is_none());
    }

    #[test]
    fn malformed_metadata_is_no_metadata() {
        let value = json!({ "groundingChunks": "not a list" });
        assert!(decode_grounding(&value).is_none());
    }

    #[test]
    fn sourceless_chunks_are_skipped() {
        let value = json!({
            "groundingChunks": [
                { "retrievedContext": { "uri": "ignored" } },
                { "web": { "uri": "https://kept.example", "title": "Kept" } }
            ]
        });

        let metadata = decode_grounding(&value).unwrap();
        assert_eq!(metadata.chunks.len(), 1);
        assert!(matches!(metadata.chunks[0], GroundingChunk::Web(_)));
    }

    #[test]
    fn maps_wins_when_both_sources_present() {
        let value = json!({
            "groundingChunks": [{
                "web": { "uri": "https://web.example", "title": "Web" },
                "maps": { "title": "Map place" }
            }]
        });

        let metadata = decode_grounding(&value).unwrap();
        assert!(matches!(metadata.chunks[0], GroundingChunk::MapPlace(_)));
    }

    #[test]
    fn search_entry_point_preserved() {
        let value = json!({
            "groundingChunks": [
                { "web": { "uri": "https://example.com", "title": "Example" } }
            ],
            "searchEntryPoint": { "renderedContent": "<div>suggestions</div>" }
        });

        let metadata = decode_grounding(&value).unwrap();
        assert_eq!(
            metadata.search_entry_point.unwrap().rendered_content,
            "<div>suggestions</div>"
        );
    }
}
