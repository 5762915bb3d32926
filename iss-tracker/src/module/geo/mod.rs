//! Geodetic location of a state vector
//!
//! Frame conversion is local and fallible; the place lookup is delegated to
//! an injected [`ReverseGeocoder`] and never fails the conversion.

pub mod frame;
pub mod geocoder;

pub use frame::{FrameError, Geodetic, inertial_to_geodetic};
pub use geocoder::{GeocodeError, NominatimGeocoder, ReverseGeocoder};

use iss_common::{GeoLocation, StateVectorRecord};
use std::sync::Arc;

/// Placeholder when the geocoder has no address or is unreachable
pub const UNKNOWN_PLACE: &str = "Over Ocean or Unknown";

#[derive(Clone)]
pub struct GeodeticConverter {
    geocoder: Arc<dyn ReverseGeocoder>,
}

impl GeodeticConverter {
    pub fn new(geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        Self { geocoder }
    }

    /// Geodetic coordinates only, no place lookup
    pub fn geodetic(record: &StateVectorRecord) -> Result<Geodetic, FrameError> {
        inertial_to_geodetic(record.position(), record.timestamp.and_utc())
    }

    pub async fn locate(&self, record: &StateVectorRecord) -> Result<GeoLocation, FrameError> {
        let geodetic = Self::geodetic(record).inspect_err(|e| {
            tracing::error!(
                "Coordinate transform failed for epoch {}: {}",
                record.canonical_timestamp(),
                e
            );
        })?;

        let place = match self.geocoder.reverse(geodetic.lat_deg, geodetic.lon_deg).await {
            Ok(Some(place)) => place,
            Ok(None) => UNKNOWN_PLACE.to_string(),
            Err(e) => {
                tracing::warn!(
                    "Reverse geocoding ({:.4}, {:.4}) failed: {}",
                    geodetic.lat_deg,
                    geodetic.lon_deg,
                    e
                );
                UNKNOWN_PLACE.to_string()
            }
        };

        Ok(GeoLocation {
            lat: geodetic.lat_deg,
            lon: geodetic.lon_deg,
            alt: geodetic.alt_km,
            place,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use reqwest::StatusCode;

    struct FixedGeocoder(Option<&'static str>);

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse(&self, _lat: f64, _lon: f64) -> Result<Option<String>, GeocodeError> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct BrokenGeocoder;

    #[async_trait]
    impl ReverseGeocoder for BrokenGeocoder {
        async fn reverse(&self, _lat: f64, _lon: f64) -> Result<Option<String>, GeocodeError> {
            Err(GeocodeError::Status(StatusCode::SERVICE_UNAVAILABLE))
        }
    }

    fn record(x: f64, y: f64, z: f64) -> StateVectorRecord {
        StateVectorRecord {
            timestamp: NaiveDate::from_ymd_opt(2024, 3, 17)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
            x,
            y,
            z,
            dx: 0.0,
            dy: 0.0,
            dz: 0.0,
        }
    }

    #[tokio::test]
    async fn test_locate_uses_geocoder_address() {
        let converter = GeodeticConverter::new(Arc::new(FixedGeocoder(Some("Houston, Texas"))));
        let geo = converter.locate(&record(-4505.7, -3322.8, 3855.9)).await.unwrap();

        assert_eq!(geo.place, "Houston, Texas");
        assert!((-90.0..=90.0).contains(&geo.lat));
        assert!((-180.0..=180.0).contains(&geo.lon));
        assert!(geo.alt > 0.0);
    }

    #[tokio::test]
    async fn test_locate_falls_back_to_placeholder() {
        let ocean = GeodeticConverter::new(Arc::new(FixedGeocoder(None)));
        let geo = ocean.locate(&record(6778.0, 0.0, 0.0)).await.unwrap();
        assert_eq!(geo.place, UNKNOWN_PLACE);

        let broken = GeodeticConverter::new(Arc::new(BrokenGeocoder));
        let geo = broken.locate(&record(6778.0, 0.0, 0.0)).await.unwrap();
        assert_eq!(geo.place, UNKNOWN_PLACE);
    }

    #[tokio::test]
    async fn test_locate_rejects_zero_position() {
        let converter = GeodeticConverter::new(Arc::new(FixedGeocoder(Some("nowhere"))));
        assert_eq!(
            converter.locate(&record(0.0, 0.0, 0.0)).await,
            Err(FrameError::ZeroLength)
        );
    }
}
