//! Best-effort location providers.

use std::time::Duration;

use async_trait::async_trait;
use kisan_core::capability::Geolocator;
use kisan_core::config::LocationConfig;
use kisan_core::query::GeoLocation;
use kisan_core::{KisanError, Result};
use reqwest::Client;
use serde::Deserialize;

/// Coordinates fixed in `config.toml`.
#[derive(Debug, Clone)]
pub struct FixedLocator {
    location: GeoLocation,
}

impl FixedLocator {
    pub fn new(location: GeoLocation) -> Self {
        Self { location }
    }
}

#[async_trait]
impl Geolocator for FixedLocator {
    async fn locate(&self) -> Result<GeoLocation> {
        Ok(self.location)
    }
}

/// Looks up approximate coordinates from an HTTP endpoint.
#[derive(Clone)]
pub struct HttpGeolocator {
    client: Client,
    lookup_url: String,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(alias = "lat")]
    latitude: f64,
    #[serde(alias = "lon", alias = "lng")]
    longitude: f64,
}

impl HttpGeolocator {
    pub fn new(lookup_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| KisanError::config(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            lookup_url: lookup_url.into(),
        })
    }
}

#[async_trait]
impl Geolocator for HttpGeolocator {
    async fn locate(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.lookup_url)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| KisanError::capability("geolocation", e.to_string()))?;

        let body: LookupResponse = response
            .json()
            .await
            .map_err(|e| KisanError::capability("geolocation", format!("Bad lookup reply: {e}")))?;

        Ok(GeoLocation::new(body.latitude, body.longitude))
    }
}

/// Picks a locator from configuration: fixed coordinates first, then the lookup URL.
pub fn detect(config: &LocationConfig) -> Option<std::sync::Arc<dyn Geolocator>> {
    if !config.enabled {
        return None;
    }

    if let (Some(latitude), Some(longitude)) = (config.latitude, config.longitude) {
        return Some(std::sync::Arc::new(FixedLocator::new(GeoLocation::new(
            latitude, longitude,
        ))));
    }

    let url = config.lookup_url.as_ref()?;
    match HttpGeolocator::new(url.clone(), Duration::from_secs(config.timeout_secs)) {
        Ok(locator) => Some(std::sync::Arc::new(locator)),
        Err(e) => {
            tracing::warn!("[Location] Lookup disabled: {}", e);
            None
        }
    }
}
