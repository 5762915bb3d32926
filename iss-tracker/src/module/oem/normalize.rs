//! Raw OEM state vectors -> StateVectorRecord

use chrono::NaiveDateTime;
use iss_common::StateVectorRecord;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use super::xml::TEXT_KEY;

/// OEM epoch, e.g. `2024-077T12:00:00.000Z` (year, day-of-year, UTC time)
pub const EPOCH_FORMAT: &str = "%Y-%jT%H:%M:%S%.fZ";

/// Canonical timestamps carry microseconds; finer epochs would be truncated.
const MAX_FRACTION_DIGITS: usize = 6;

#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("missing field {0}")]
    MissingField(&'static str),

    #[error("invalid EPOCH {value:?}: {source}")]
    InvalidEpoch {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("EPOCH {value:?} needs 1 to 6 fractional-second digits")]
    EpochPrecision { value: String },

    #[error("invalid {field} value {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

pub fn parse_epoch(value: &str) -> Result<NaiveDateTime, NormalizeError> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_suffix('Z')
        .and_then(|rest| rest.rsplit_once('.'))
        .map(|(_, fraction)| fraction)
        .filter(|fraction| fraction.bytes().all(|b| b.is_ascii_digit()))
        .map_or(0, str::len);
    if !(1..=MAX_FRACTION_DIGITS).contains(&digits) {
        return Err(NormalizeError::EpochPrecision {
            value: value.to_string(),
        });
    }

    NaiveDateTime::parse_from_str(trimmed, EPOCH_FORMAT).map_err(|source| {
        NormalizeError::InvalidEpoch {
            value: value.to_string(),
            source,
        }
    })
}

/// Read `entry[field]["#text"]` as a float.
fn numeric_field(entry: &Value, field: &'static str) -> Result<f64, NormalizeError> {
    let text = entry
        .get(field)
        .and_then(|wrapped| wrapped.get(TEXT_KEY))
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingField(field))?;

    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| NormalizeError::InvalidNumber {
            field,
            value: text.to_string(),
        })
}

/// Convert one raw `stateVector` entry. Fails on the first missing or
/// unparsable field.
pub fn normalize_entry(entry: &Value) -> Result<StateVectorRecord, NormalizeError> {
    let epoch = entry
        .get("EPOCH")
        .and_then(Value::as_str)
        .ok_or(NormalizeError::MissingField("EPOCH"))?;

    Ok(StateVectorRecord {
        timestamp: parse_epoch(epoch)?,
        x: numeric_field(entry, "X")?,
        y: numeric_field(entry, "Y")?,
        z: numeric_field(entry, "Z")?,
        dx: numeric_field(entry, "X_DOT")?,
        dy: numeric_field(entry, "Y_DOT")?,
        dz: numeric_field(entry, "Z_DOT")?,
    })
}

/// Normalize every entry, dropping (and logging) malformed ones. Output order
/// follows input order.
pub fn normalize(raw: &[Value]) -> Vec<StateVectorRecord> {
    raw.iter()
        .enumerate()
        .filter_map(|(index, entry)| match normalize_entry(entry) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Skipping state vector #{}: {}", index, e);
                None
            }
        })
        .collect()
}
