//! Gemini API client configuration.

use crate::mode::ChatMode;
use crate::ChatError;

/// Gemini API client configuration.
#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub maps_model: String,
    pub pro_model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("maps_model", &self.maps_model)
            .field("pro_model", &self.pro_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl GeminiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            maps_model: ChatMode::MapsAndSearch.default_model().to_string(),
            pro_model: ChatMode::ProChat.default_model().to_string(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }

    /// Create config from environment.
    ///
    /// Resolution order for the key:
    /// 1. `GEMINI_API_KEY` env var
    /// 2. `API_KEY` env var
    ///
    /// `GEMINI_MAPS_MODEL` and `GEMINI_PRO_MODEL` override the per-mode
    /// models when set.
    pub fn from_env() -> Result<Self, ChatError> {
        let key = std::env::var("GEMINI_API_KEY")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| {
                ChatError::ApiError("Gemini API not configured. Set GEMINI_API_KEY.".into())
            })?;

        let mut config = Self::new(key);
        if let Ok(model) = std::env::var("GEMINI_MAPS_MODEL") {
            config.maps_model = model;
        }
        if let Ok(model) = std::env::var("GEMINI_PRO_MODEL") {
            config.pro_model = model;
        }
        Ok(config)
    }

    /// Model serving the given mode.
    pub fn model_for(&self, mode: ChatMode) -> &str {
        match mode {
            ChatMode::MapsAndSearch => &self.maps_model,
            ChatMode::ProChat => &self.pro_model,
        }
    }

    pub fn with_maps_model(mut self, model: impl Into<String>) -> Self {
        self.maps_model = model.into();
        self
    }

    pub fn with_pro_model(mut self, model: impl Into<String>) -> Self {
        self.pro_model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_api_key() {
        let config = GeminiConfig::new("super-secret");
        let printed = format!("{config:?}");
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn defaults_follow_modes() {
        let config = GeminiConfig::new("k");
        assert_eq!(config.model_for(ChatMode::MapsAndSearch), "gemini-2.5-flash");
        assert_eq!(config.model_for(ChatMode::ProChat), "gemini-3-pro-preview");
    }

    #[test]
    fn builders_override_defaults() {
        let config = GeminiConfig::new("k")
            .with_maps_model("flash-next")
            .with_pro_model("pro-next")
            .with_max_tokens(512)
            .with_temperature(0.2);
        assert_eq!(config.model_for(ChatMode::MapsAndSearch), "flash-next");
        assert_eq!(config.model_for(ChatMode::ProChat), "pro-next");
        assert_eq!(config.max_tokens, 512);
        assert_eq!(config.temperature, 0.2);
    }

    #[test]
    fn from_env_reads_key_and_model_overrides() {
        std::env::set_var("GEMINI_API_KEY", "env-key");
        std::env::set_var("GEMINI_MAPS_MODEL", "flash-custom");

        let config = GeminiConfig::from_env().unwrap();
        assert_eq!(config.api_key, "env-key");
        assert_eq!(config.maps_model, "flash-custom");
        assert_eq!(config.pro_model, ChatMode::ProChat.default_model());

        std::env::remove_var("GEMINI_API_KEY");
        std::env::remove_var("GEMINI_MAPS_MODEL");
    }
}
