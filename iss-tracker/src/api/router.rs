use axum::{Router, http::Request, routing::get};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use super::handlers;
use super::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let trace = TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
        tracing::info_span!(
            "request",
            id = %Uuid::now_v7(),
            method = %request.method(),
            uri = %request.uri(),
        )
    });

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/header", get(handlers::get_header))
        .route("/comment", get(handlers::get_comment))
        .route("/metadata", get(handlers::get_metadata))
        .route("/epochs", get(handlers::list_epochs))
        .route("/epochs/{epoch}", get(handlers::get_epoch))
        .route("/epochs/{epoch}/speed", get(handlers::get_epoch_speed))
        .route("/epochs/{epoch}/location", get(handlers::get_epoch_location))
        .route("/now", get(handlers::get_now))
        .route("/summary", get(handlers::get_summary))
        .layer(CorsLayer::permissive())
        .layer(trace)
        .with_state(state)
}
