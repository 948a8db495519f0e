//! Gemini API client struct and request building.

use crate::mode::ChatMode;
use crate::{ChatRequest, Role};

use super::config::GeminiConfig;

pub(crate) const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini API client.
pub struct GeminiClient {
    pub(crate) config: GeminiConfig,
    pub(crate) http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::builder()
                .connect_timeout(std::time::Duration::from_secs(10))
                .timeout(std::time::Duration::from_secs(120))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    pub(crate) fn api_url(&self, mode: ChatMode) -> String {
        format!(
            "{}/{}:streamGenerateContent",
            GEMINI_API_BASE,
            self.config.model_for(mode)
        )
    }

    /// Build the JSON request body for one streaming turn.
    pub(crate) fn build_request_body(&self, request: &ChatRequest) -> serde_json::Value {
        let mut contents = Vec::new();

        for turn in &request.history {
            let role = match turn.role {
                Role::User => "user",
                Role::Model => "model",
            };
            contents.push(serde_json::json!({
                "role": role,
                "parts": [{ "text": turn.text }]
            }));
        }
        contents.push(serde_json::json!({
            "role": "user",
            "parts": [{ "text": request.message }]
        }));

        let mut body = serde_json::json!({
            "contents": contents,
            "systemInstruction": {
                "parts": [{ "text": request.mode.system_instruction() }]
            },
            "generationConfig": {
                "maxOutputTokens": self.config.max_tokens,
                "temperature": self.config.temperature,
            }
        });

        if request.mode.uses_retrieval_tools() {
            body["tools"] = serde_json::json!([
                { "googleMaps": {} },
                { "googleSearch": {} }
            ]);
            // Bias retrieval toward the user's position when we have one
            if let Some(position) = request.location {
                body["toolConfig"] = serde_json::json!({
                    "retrievalConfig": {
                        "latLng": {
                            "latitude": position.latitude,
                            "longitude": position.longitude,
                        }
                    }
                });
            }
        }

        body
    }
}
