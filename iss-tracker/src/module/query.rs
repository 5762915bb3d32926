//! Queries over a normalized, chronologically ordered state-vector list
use chrono::{NaiveDateTime, Utc};
use iss_common::StateVectorRecord;
use tracing::{debug, error};

/// First and last epoch of the list. Relies on feed order, does not sort.
pub fn data_range(records: &[StateVectorRecord]) -> Option<(NaiveDateTime, NaiveDateTime)> {
    match (records.first(), records.last()) {
        (Some(first), Some(last)) => Some((first.timestamp, last.timestamp)),
        _ => {
            error!("Cannot compute data range of an empty state vector list");
            None
        }
    }
}

/// Record whose epoch is nearest to `instant`; ties go to the earliest entry.
pub fn closest_to(records: &[StateVectorRecord], instant: NaiveDateTime) -> Option<&StateVectorRecord> {
    let closest = records
        .iter()
        .min_by_key(|record| record.timestamp.signed_duration_since(instant).abs());

    if closest.is_none() {
        error!("Cannot find closest epoch in an empty state vector list");
    }
    closest
}

pub fn closest_to_now(records: &[StateVectorRecord]) -> Option<&StateVectorRecord> {
    closest_to(records, Utc::now().naive_utc())
}

/// Mean of the per-record speeds, km/s
pub fn average_speed(records: &[StateVectorRecord]) -> Option<f64> {
    if records.is_empty() {
        error!("Cannot average speed over an empty state vector list");
        return None;
    }
    let total: f64 = records.iter().map(instantaneous_speed).sum();
    Some(total / records.len() as f64)
}

pub fn instantaneous_speed(record: &StateVectorRecord) -> f64 {
    record.speed()
}

/// Exact match on the canonical `YYYY-MM-DD hh:mm:ss.ffffff` rendering.
pub fn find_by_timestamp<'a>(
    records: &'a [StateVectorRecord],
    timestamp: &str,
) -> Option<&'a StateVectorRecord> {
    let found = records
        .iter()
        .find(|record| record.canonical_timestamp() == timestamp);

    if found.is_none() {
        debug!("No state vector with epoch {:?}", timestamp);
    }
    found
}
