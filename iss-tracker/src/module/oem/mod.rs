//! Orbit Ephemeris Message (OEM) ingestion
//!
//! Fetch -> XML tree -> fixed-path extraction -> normalized state vectors.

pub mod document;
pub mod fetcher;
pub mod normalize;
pub mod xml;

pub use document::OemDocument;
pub use fetcher::{CachedSource, EphemerisSource, FetchError, HttpEphemerisSource};
pub use normalize::{NormalizeError, normalize, normalize_entry, parse_epoch};
pub use xml::{TEXT_KEY, XmlError, parse_xml};
