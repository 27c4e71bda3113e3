//! Workflow API request/response types.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use pillcount_models::WorkflowOutput;
use serde::{Deserialize, Serialize};

/// Body of a workflow run request.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRequest {
    pub api_key: String,
    pub use_cache: bool,
    pub inputs: WorkflowInputs,
}

/// Named workflow inputs. The workflow declares a single `image` input.
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInputs {
    pub image: ImageInput,
}

/// Inline image input.
#[derive(Debug, Clone, Serialize)]
pub struct ImageInput {
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}

impl ImageInput {
    /// Base64-encode raw image file bytes.
    pub fn base64(bytes: &[u8]) -> Self {
        Self {
            kind: "base64".to_string(),
            value: STANDARD.encode(bytes),
        }
    }
}

impl WorkflowRequest {
    pub fn new(api_key: impl Into<String>, use_cache: bool, image: ImageInput) -> Self {
        Self {
            api_key: api_key.into(),
            use_cache,
            inputs: WorkflowInputs { image },
        }
    }
}

/// Workflow run response: one output mapping per input image.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorkflowResponse {
    #[serde(default)]
    pub outputs: Vec<WorkflowOutput>,
}
