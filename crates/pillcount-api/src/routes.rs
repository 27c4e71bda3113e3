//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::services::ServeDir;

use crate::handlers::{demo_images, health, index, not_found, predict};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, mask_internal_errors, request_id, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let page_routes = Router::new()
        .route("/", get(index))
        .route("/demo-images", get(demo_images))
        .route("/predict", post(predict));

    let static_routes = Router::new().nest_service("/public", ServeDir::new(&state.config.public_dir));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    // Uploads are unbounded unless MAX_BODY_SIZE is set
    let body_limit = match state.config.max_body_size {
        Some(limit) => DefaultBodyLimit::max(limit),
        None => DefaultBodyLimit::disable(),
    };

    let mut router = Router::new()
        .merge(page_routes)
        .merge(static_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .fallback(not_found);

    // Don't expose internal error details in production
    if state.config.is_production() {
        router = router.layer(middleware::from_fn(mask_internal_errors));
    }

    router
        .layer(body_limit)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_id))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
