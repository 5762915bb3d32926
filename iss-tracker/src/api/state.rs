use iss_common::StateVectorRecord;
use reqwest::Client;
use std::sync::Arc;

use super::error::AppError;
use crate::config::TrackerConfig;
use crate::module::geo::{GeodeticConverter, NominatimGeocoder, ReverseGeocoder};
use crate::module::oem::{CachedSource, EphemerisSource, HttpEphemerisSource, OemDocument};

/// Shared, read-only dependencies of every handler
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn EphemerisSource>,
    pub converter: GeodeticConverter,
}

impl AppState {
    pub fn new(source: Arc<dyn EphemerisSource>, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self {
            source,
            converter: GeodeticConverter::new(geocoder),
        }
    }

    /// Wire up the HTTP feed (cached if configured) and the Nominatim geocoder.
    pub fn from_config(config: &TrackerConfig, client: Client) -> Self {
        let http_source = HttpEphemerisSource::new(
            client.clone(),
            config.source_url.clone(),
            config.fetch_timeout(),
        );
        let source: Arc<dyn EphemerisSource> = match config.cache_ttl() {
            Some(ttl) => {
                tracing::info!("Ephemeris cache enabled (ttl {:?})", ttl);
                Arc::new(CachedSource::new(http_source, ttl))
            }
            None => Arc::new(http_source),
        };

        let geocoder = NominatimGeocoder::new(
            client,
            config.geocoder_url.clone(),
            config.geocoder_user_agent.clone(),
            config.geocode_timeout(),
        );

        Self::new(source, Arc::new(geocoder))
    }

    pub async fn load_document(&self) -> Result<OemDocument, AppError> {
        Ok(self.source.fetch().await?)
    }

    pub async fn load_records(&self) -> Result<Vec<StateVectorRecord>, AppError> {
        Ok(self.load_document().await?.records())
    }
}
