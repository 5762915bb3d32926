//! Reverse geocoding client (Nominatim-compatible)
use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Nominatim zoom 15 resolves to roughly street / suburb granularity
pub const REVERSE_ZOOM: u8 = 15;
pub const REVERSE_LANGUAGE: &str = "en";

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("reverse geocode request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("geocoder returned HTTP {0}")]
    Status(StatusCode),
}

/// Resolves a latitude/longitude to a human-readable address.
///
/// `Ok(None)` means the service answered but has nothing there (open ocean).
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
    user_agent: String,
    timeout: Duration,
}

impl NominatimGeocoder {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        user_agent: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            timeout,
        }
    }

    fn reverse_url(&self, lat: f64, lon: f64) -> String {
        format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}&zoom={}&accept-language={}",
            self.base_url, lat, lon, REVERSE_ZOOM, REVERSE_LANGUAGE
        )
    }
}

#[async_trait]
impl ReverseGeocoder for NominatimGeocoder {
    async fn reverse(&self, lat: f64, lon: f64) -> Result<Option<String>, GeocodeError> {
        let response = self
            .client
            .get(self.reverse_url(lat, lon))
            .header(USER_AGENT, &self.user_agent)
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GeocodeError::Status(response.status()));
        }

        let body: ReverseResponse = response.json().await?;
        if let Some(reason) = body.error {
            tracing::debug!("No address at ({}, {}): {}", lat, lon, reason);
        }
        Ok(body.display_name.filter(|name| !name.is_empty()))
    }
}
