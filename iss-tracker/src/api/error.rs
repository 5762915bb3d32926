use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::module::geo::FrameError;
use crate::module::oem::FetchError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Epoch not found")]
    EpochNotFound,

    #[error("No epochs available")]
    NoEpochs,

    #[error("Upstream ephemeris unavailable")]
    Upstream(#[from] FetchError),

    #[error("{0}")]
    Transform(#[from] FrameError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::EpochNotFound | AppError::NoEpochs => StatusCode::NOT_FOUND,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Transform(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Upstream details are already logged by the source
        let body = Json(json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}
