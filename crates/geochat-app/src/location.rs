//! Location providers for the terminal front-end.
//!
//! There is no browser geolocation here; the position comes from the
//! `--location` flag or the `GEOCHAT_LOCATION` env var. When neither is
//! set the probe fails with a readable reason and the chat runs without
//! a retrieval bias.

use async_trait::async_trait;

use geochat_ai::{Coordinates, LocationError, LocationProvider};

/// Provider that always reports one configured position.
pub struct FixedLocationProvider {
    position: Coordinates,
}

impl FixedLocationProvider {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

#[async_trait]
impl LocationProvider for FixedLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.position)
    }
}

/// Provider used when no position is configured at all.
pub struct DeniedLocationProvider;

#[async_trait]
impl LocationProvider for DeniedLocationProvider {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Err(LocationError::Unavailable(
            "no position configured; pass --location or set GEOCHAT_LOCATION".into(),
        ))
    }
}

/// Pick a provider from the flag, then the env var, then give up.
pub fn resolve_provider(flag: Option<&str>) -> Box<dyn LocationProvider> {
    let configured = flag
        .map(str::to_string)
        .or_else(|| std::env::var("GEOCHAT_LOCATION").ok());
    match configured.as_deref().map(parse_coordinates) {
        Some(Ok(position)) => Box::new(FixedLocationProvider::new(position)),
        Some(Err(reason)) => {
            tracing::warn!(reason = %reason, "ignoring malformed position");
            Box::new(DeniedLocationProvider)
        }
        None => Box::new(DeniedLocationProvider),
    }
}

/// Parse a "lat,lon" pair.
pub fn parse_coordinates(raw: &str) -> Result<Coordinates, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected \"lat,lon\", got {raw:?}"))?;
    let latitude: f64 = lat
        .trim()
        .parse()
        .map_err(|_| format!("bad latitude {:?}", lat.trim()))?;
    let longitude: f64 = lon
        .trim()
        .parse()
        .map_err(|_| format!("bad longitude {:?}", lon.trim()))?;
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(format!("latitude {latitude} out of range"));
    }
    if !(-180.0..=180.0).contains(&longitude) {
        return Err(format!("longitude {longitude} out of range"));
    }
    Ok(Coordinates {
        latitude,
        longitude,
    })
}
