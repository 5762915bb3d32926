use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use iss_common::{GeoLocation, StateVectorRecord, canonical_timestamp, decode_epoch_segment};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::error::AppError;
use super::state::AppState;
use crate::module::query::{
    average_speed, closest_to_now, data_range, find_by_timestamp, instantaneous_speed,
};

#[derive(Debug, Deserialize)]
pub struct EpochsQuery {
    pub limit: Option<usize>,
    #[serde(default)]
    pub offset: usize,
}

#[derive(Debug, Serialize)]
pub struct SpeedResponse {
    pub speed: f64,
}

#[derive(Debug, Serialize)]
pub struct NowResponse {
    pub closest_epoch: StateVectorRecord,
    pub speed: f64,
    /// `None` when the coordinate transform failed
    pub geo: Option<GeoLocation>,
}

#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub first_epoch: Option<String>,
    pub last_epoch: Option<String>,
    pub count: usize,
    pub average_speed: Option<f64>,
}

/// Liveness probe
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

pub async fn get_header(State(state): State<AppState>) -> Result<Json<Map<String, Value>>, AppError> {
    Ok(Json(state.load_document().await?.header()))
}

pub async fn get_comment(State(state): State<AppState>) -> Result<Json<Vec<String>>, AppError> {
    Ok(Json(state.load_document().await?.comments()))
}

pub async fn get_metadata(State(state): State<AppState>) -> Result<Json<Map<String, Value>>, AppError> {
    Ok(Json(state.load_document().await?.metadata()))
}

/// `offset` defaults to 0, a missing `limit` means the rest of the list
pub async fn list_epochs(
    State(state): State<AppState>,
    Query(query): Query<EpochsQuery>,
) -> Result<Json<Vec<StateVectorRecord>>, AppError> {
    let records = state.load_records().await?;
    let page = records
        .into_iter()
        .skip(query.offset)
        .take(query.limit.unwrap_or(usize::MAX))
        .collect();
    Ok(Json(page))
}

/// Resolve a `YYYY-MM-DD__hh_mm_ss.ffffff` path segment against the feed.
async fn find_epoch(state: &AppState, segment: &str) -> Result<StateVectorRecord, AppError> {
    let records = state.load_records().await?;
    let timestamp = decode_epoch_segment(segment);
    find_by_timestamp(&records, &timestamp)
        .copied()
        .ok_or(AppError::EpochNotFound)
}

pub async fn get_epoch(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> Result<Json<StateVectorRecord>, AppError> {
    Ok(Json(find_epoch(&state, &epoch).await?))
}

pub async fn get_epoch_speed(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> Result<Json<SpeedResponse>, AppError> {
    let record = find_epoch(&state, &epoch).await?;
    Ok(Json(SpeedResponse {
        speed: instantaneous_speed(&record),
    }))
}

pub async fn get_epoch_location(
    State(state): State<AppState>,
    Path(epoch): Path<String>,
) -> Result<Json<GeoLocation>, AppError> {
    let record = find_epoch(&state, &epoch).await?;
    Ok(Json(state.converter.locate(&record).await?))
}

pub async fn get_now(State(state): State<AppState>) -> Result<Json<NowResponse>, AppError> {
    let records = state.load_records().await?;
    let record = *closest_to_now(&records).ok_or(AppError::NoEpochs)?;

    // Transform failures are logged by the converter; report the epoch anyway
    let geo = state.converter.locate(&record).await.ok();

    Ok(Json(NowResponse {
        closest_epoch: record,
        speed: instantaneous_speed(&record),
        geo,
    }))
}

pub async fn get_summary(State(state): State<AppState>) -> Result<Json<SummaryResponse>, AppError> {
    let records = state.load_records().await?;
    let range = if records.is_empty() { None } else { data_range(&records) };
    let speed = if records.is_empty() { None } else { average_speed(&records) };

    Ok(Json(SummaryResponse {
        first_epoch: range.map(|(first, _)| canonical_timestamp::format(&first)),
        last_epoch: range.map(|(_, last)| canonical_timestamp::format(&last)),
        count: records.len(),
        average_speed: speed,
    }))
}

