//! Upload → workflow → annotated image.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::Json;
use pillcount_media::{decode_upload, encode_jpeg, jpeg_data_url, ANNOTATED_JPEG_QUALITY};
use pillcount_models::{extract_predictions, Detection};
use pillcount_workflow::StagedImage;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Multipart field carrying the upload.
pub const UPLOAD_FIELD: &str = "file";

/// Successful prediction.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Always `predictions.len()`
    pub count: usize,
    /// `data:image/jpeg;base64,...`
    pub annotated_image: String,
    pub predictions: Vec<Detection>,
}

impl PredictResponse {
    pub fn new(annotated_image: String, predictions: Vec<Detection>) -> Self {
        Self {
            count: predictions.len(),
            annotated_image,
            predictions,
        }
    }
}

/// Run the detection workflow on an uploaded image.
pub async fn predict(State(state): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<PredictResponse>> {
    let upload = read_upload(&mut multipart).await?;
    let upload_bytes = upload.len();

    let (image, staged) = tokio::task::spawn_blocking(move || -> ApiResult<_> {
        let image = decode_upload(&upload).map_err(|e| {
            warn!(error = %e, bytes = upload.len(), "Rejected upload");
            metrics::record_upload_rejected();
            ApiError::InvalidImage(e.to_string())
        })?;
        let staged = StagedImage::stage(&image)?;
        Ok((image, staged))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Decode task failed: {}", e)))??;

    let (width, height) = image.dimensions();
    info!(width, height, bytes = upload_bytes, "Submitting upload to workflow");

    let started = Instant::now();
    let outcome = state.workflow.run_staged(&staged).await;
    drop(staged);

    let outputs = match outcome {
        Ok(outputs) => {
            metrics::record_workflow_duration(started.elapsed().as_secs_f64());
            outputs
        }
        Err(e) => {
            error!(error = %e, "Workflow call failed");
            metrics::record_workflow_failure();
            return Err(e.into());
        }
    };

    let mode = state.config.variant.extraction_mode();
    let predictions = outputs
        .first()
        .map(|output| extract_predictions(output, mode))
        .unwrap_or_default();

    // The decoded upload is not needed afterwards, so it is annotated in place
    let annotator = Arc::clone(&state.annotator);
    let (annotated_image, predictions) = tokio::task::spawn_blocking(move || -> ApiResult<_> {
        let mut annotated = image;
        annotator.annotate(&mut annotated, &predictions);
        let jpeg = encode_jpeg(&annotated, ANNOTATED_JPEG_QUALITY)
            .map_err(|e| ApiError::internal(format!("Failed to encode annotated image: {}", e)))?;
        Ok((jpeg_data_url(&jpeg), predictions))
    })
    .await
    .map_err(|e| ApiError::internal(format!("Annotation task failed: {}", e)))??;

    metrics::record_detections(predictions.len());
    info!(
        count = predictions.len(),
        variant = %state.config.variant,
        "Prediction completed"
    );

    Ok(Json(PredictResponse::new(annotated_image, predictions)))
}

/// Bytes of the `file` field; other fields are skipped.
async fn read_upload(multipart: &mut Multipart) -> ApiResult<Bytes> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(format!("Malformed multipart body: {}", e)))?
    {
        if field.name() == Some(UPLOAD_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(format!("Failed to read upload: {}", e)));
        }
    }

    Err(ApiError::bad_request("No file uploaded"))
}
