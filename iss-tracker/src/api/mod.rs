//! HTTP surface: one fetch/normalize cycle per request, JSON out

pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
