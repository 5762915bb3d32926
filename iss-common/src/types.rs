use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One ISS state vector: epoch plus Cartesian position (km) and velocity (km/s)
/// in the Earth-centered inertial frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVectorRecord {
    /// Epoch, UTC implied
    #[serde(with = "canonical_timestamp")]
    pub timestamp: NaiveDateTime,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl StateVectorRecord {
    /// Timestamp rendered as `YYYY-MM-DD hh:mm:ss.ffffff`
    pub fn canonical_timestamp(&self) -> String {
        canonical_timestamp::format(&self.timestamp)
    }

    pub fn position(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }

    /// Magnitude of the velocity vector, km/s
    pub fn speed(&self) -> f64 {
        (self.dx * self.dx + self.dy * self.dy + self.dz * self.dz).sqrt()
    }
}

/// Geodetic position of a state vector plus its reverse-geocoded place name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    /// Latitude, degrees
    pub lat: f64,
    /// Longitude, degrees
    pub lon: f64,
    /// Altitude above the ellipsoid, km
    pub alt: f64,
    pub place: String,
}

/// Serde adapter for the canonical `YYYY-MM-DD hh:mm:ss.ffffff` rendering.
pub mod canonical_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";
    const PARSE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    pub fn format(timestamp: &NaiveDateTime) -> String {
        timestamp.format(FORMAT).to_string()
    }

    pub fn parse(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
        NaiveDateTime::parse_from_str(value, PARSE_FORMAT)
    }

    pub fn serialize<S>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format(timestamp))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        parse(&value).map_err(serde::de::Error::custom)
    }
}

/// Turn a URL path segment such as `2024-03-17__12_00_00.000000` back into
/// the canonical timestamp `2024-03-17 12:00:00.000000`.
pub fn decode_epoch_segment(segment: &str) -> String {
    segment.replace("__", " ").replace('_', ":")
}

pub fn encode_epoch_segment(timestamp: &str) -> String {
    timestamp.replace(' ', "__").replace(':', "_")
}
