//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::{Request, Response};
use axum::middleware::Next;
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "pillcount_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "pillcount_http_request_duration_seconds";
    pub const HTTP_REQUESTS_IN_FLIGHT: &str = "pillcount_http_requests_in_flight";

    // Prediction metrics
    pub const UPLOADS_REJECTED_TOTAL: &str = "pillcount_uploads_rejected_total";
    pub const WORKFLOW_DURATION_SECONDS: &str = "pillcount_workflow_duration_seconds";
    pub const WORKFLOW_FAILURES_TOTAL: &str = "pillcount_workflow_failures_total";
    pub const DETECTIONS_PER_REQUEST: &str = "pillcount_detections_per_request";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an upload that could not be decoded.
pub fn record_upload_rejected() {
    counter!(names::UPLOADS_REJECTED_TOTAL).increment(1);
}

/// Record a successful workflow round trip.
pub fn record_workflow_duration(duration_secs: f64) {
    histogram!(names::WORKFLOW_DURATION_SECONDS).record(duration_secs);
}

/// Record a failed workflow call.
pub fn record_workflow_failure() {
    counter!(names::WORKFLOW_FAILURES_TOTAL).increment(1);
}

/// Record how many detections one request produced.
pub fn record_detections(count: usize) {
    histogram!(names::DETECTIONS_PER_REQUEST).record(count as f64);
}

/// Collapse static asset paths so file names don't become label values.
fn sanitize_path(path: &str) -> String {
    match path {
        "/" | "/predict" | "/demo-images" | "/health" | "/healthz" | "/metrics" => path.to_string(),
        p if p.starts_with("/public/") => "/public/*".to_string(),
        _ => "other".to_string(),
    }
}

/// Metrics middleware for HTTP requests.
pub async fn metrics_middleware(request: Request<Body>, next: Next) -> Response<Body> {
    let method = request.method().to_string();
    let path = request.uri().path().to_string();
    let start = Instant::now();

    // Increment in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).increment(1.0);

    let response = next.run(request).await;

    // Decrement in-flight counter
    gauge!(names::HTTP_REQUESTS_IN_FLIGHT).decrement(1.0);

    let status = response.status().as_u16();
    let duration = start.elapsed().as_secs_f64();

    record_http_request(&method, &path, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path() {
        assert_eq!(sanitize_path("/predict"), "/predict");
        assert_eq!(sanitize_path("/public/demo_images/pills_01.jpg"), "/public/*");
        assert_eq!(sanitize_path("/wp-admin/setup.php"), "other");
    }
}
