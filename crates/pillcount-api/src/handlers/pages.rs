//! Landing page and demo image listing.

use std::path::Path;

use axum::extract::State;
use axum::http::Uri;
use axum::response::Html;
use axum::Json;
use serde::Serialize;
use tracing::{debug, error, warn};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Extensions (lowercase, without dot) offered as demo inputs.
pub const DEMO_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

/// Public URL prefix of the demo image directory.
pub const DEMO_IMAGES_URL_PREFIX: &str = "/public/demo_images";

/// Serve the landing page.
pub async fn index(State(state): State<AppState>) -> ApiResult<Html<String>> {
    let path = &state.config.index_path;
    match tokio::fs::read_to_string(path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            error!(path = %path.display(), error = %e, "Failed to read landing page");
            Err(ApiError::internal(format!("Landing page unavailable: {}", e)))
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DemoImagesResponse {
    pub images: Vec<String>,
}

/// List demo images as public URLs.
pub async fn demo_images(State(state): State<AppState>) -> Json<DemoImagesResponse> {
    let images = list_demo_images(&state.config.demo_dir()).await;
    Json(DemoImagesResponse { images })
}

/// Public URLs of the demo images in `dir`, sorted by file name.
///
/// A missing or unreadable directory yields an empty list.
pub async fn list_demo_images(dir: &Path) -> Vec<String> {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %dir.display(), error = %e, "Demo image directory unavailable");
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Stopped listing demo images");
                break;
            }
        };

        let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if is_file && has_demo_extension(&name) {
            names.push(name);
        }
    }

    names.sort();
    names
        .into_iter()
        .map(|name| format!("{}/{}", DEMO_IMAGES_URL_PREFIX, name))
        .collect()
}

fn has_demo_extension(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| DEMO_IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(uri.path().to_string())
}
