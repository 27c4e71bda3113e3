//! Axum HTTP server for annotated object counts.
//!
//! This crate provides:
//! - `POST /predict`: upload → hosted workflow → annotated JPEG + detections
//! - Landing page, demo image listing and static assets
//! - Request id, security headers and request logging middleware
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
