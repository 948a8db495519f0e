//! Chat modes and their fixed request profiles.
//!
//! Each mode maps to a closed configuration record: which model answers,
//! which system instruction frames it, and whether retrieval tools
//! (Google Maps + Google Search) are attached to the request.

const MAPS_SYSTEM_INSTRUCTION: &str = "You are a helpful location expert and navigator. \
Use Google Maps and Search to provide accurate, real-time information about places, routes, \
and local businesses. Always double-check opening hours and ratings if available. \
Format your response clearly with markdown.";

const PRO_SYSTEM_INSTRUCTION: &str = "You are a helpful, intelligent AI assistant. \
You can discuss complex topics, reason through problems, and provide creative assistance.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ChatMode {
    /// Location-expert answers grounded in Google Maps and Google Search.
    MapsAndSearch,
    /// General-purpose assistant without retrieval tools.
    ProChat,
}

impl ChatMode {
    /// Model serving this mode unless overridden in config.
    pub fn default_model(&self) -> &'static str {
        match self {
            ChatMode::MapsAndSearch => "gemini-2.5-flash",
            ChatMode::ProChat => "gemini-3-pro-preview",
        }
    }

    pub fn system_instruction(&self) -> &'static str {
        match self {
            ChatMode::MapsAndSearch => MAPS_SYSTEM_INSTRUCTION,
            ChatMode::ProChat => PRO_SYSTEM_INSTRUCTION,
        }
    }

    /// Whether requests in this mode carry the Maps + Search tools.
    pub fn uses_retrieval_tools(&self) -> bool {
        matches!(self, ChatMode::MapsAndSearch)
    }
}
