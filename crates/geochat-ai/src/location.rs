//! Geolocation seam.
//!
//! The conversation itself never talks to a positioning system; callers
//! resolve a position once through a `LocationProvider` and hand the
//! coordinates over. Provider failure is expected and non-fatal — the
//! chat simply runs without a retrieval bias.

use async_trait::async_trait;

/// A position used to bias Maps-mode retrieval toward local results.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// One-shot source of the current position.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum LocationError {
    #[error("location access denied")]
    Denied,
    #[error("location unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(LocationError::Denied.to_string(), "location access denied");
        assert_eq!(
            LocationError::Unavailable("no provider".into()).to_string(),
            "location unavailable: no provider"
        );
    }
}
