//! Workflow API HTTP client.

use std::fmt;

use image::RgbImage;
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::error::{WorkflowError, WorkflowResult};
use crate::staging::StagedImage;
use crate::types::{ImageInput, WorkflowRequest, WorkflowResponse};
use pillcount_models::WorkflowOutput;

/// Configuration for the workflow client.
#[derive(Clone)]
pub struct WorkflowConfig {
    /// Base URL of the hosted inference API
    pub api_url: String,
    /// Provider API key
    pub api_key: String,
    /// Workspace that owns the workflow
    pub workspace: String,
    /// Workflow identifier within the workspace
    pub workflow_id: String,
    /// Let the provider reuse a cached workflow definition
    pub use_cache: bool,
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            api_url: "https://serverless.roboflow.com".to_string(),
            api_key: String::new(),
            workspace: "charbels-workspace-dyeep".to_string(),
            workflow_id: "detect-count-and-visualize".to_string(),
            use_cache: true,
        }
    }
}

impl fmt::Debug for WorkflowConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WorkflowConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &if self.api_key.is_empty() { "<unset>" } else { "<redacted>" })
            .field("workspace", &self.workspace)
            .field("workflow_id", &self.workflow_id)
            .field("use_cache", &self.use_cache)
            .finish()
    }
}

impl WorkflowConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api_url: std::env::var("WORKFLOW_API_URL").unwrap_or(defaults.api_url),
            api_key: std::env::var("ROBOFLOW_API_KEY").unwrap_or(defaults.api_key),
            workspace: std::env::var("WORKFLOW_WORKSPACE").unwrap_or(defaults.workspace),
            workflow_id: std::env::var("WORKFLOW_ID").unwrap_or(defaults.workflow_id),
            use_cache: std::env::var("WORKFLOW_USE_CACHE")
                .map(|v| !matches!(v.to_lowercase().as_str(), "false" | "0" | "no"))
                .unwrap_or(defaults.use_cache),
        }
    }

    /// URL of the workflow run endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/workflows/{}",
            self.api_url.trim_end_matches('/'),
            self.workspace,
            self.workflow_id
        )
    }

    pub fn has_api_key(&self) -> bool {
        !self.api_key.is_empty()
    }
}

/// Client for the hosted detection workflow.
///
/// No timeout or retry is configured: a call lasts as long as the provider
/// takes to answer or fail.
#[derive(Debug, Clone)]
pub struct WorkflowClient {
    http: Client,
    config: WorkflowConfig,
}

impl WorkflowClient {
    /// Create a new workflow client.
    pub fn new(config: WorkflowConfig) -> WorkflowResult<Self> {
        let http = Client::builder().build().map_err(WorkflowError::Network)?;

        if !config.has_api_key() {
            warn!("ROBOFLOW_API_KEY is not set; workflow calls will be rejected by the provider");
        }

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> WorkflowResult<Self> {
        Self::new(WorkflowConfig::from_env())
    }

    pub fn config(&self) -> &WorkflowConfig {
        &self.config
    }

    /// Stage `image` and run the workflow on it.
    ///
    /// The staged file is deleted before this returns, on every path.
    pub async fn run(&self, image: &RgbImage) -> WorkflowResult<Vec<WorkflowOutput>> {
        let staged = StagedImage::stage(image)?;
        self.run_staged(&staged).await
    }

    /// Run the workflow on an already staged image.
    pub async fn run_staged(&self, staged: &StagedImage) -> WorkflowResult<Vec<WorkflowOutput>> {
        let bytes = tokio::fs::read(staged.path()).await?;
        let request = WorkflowRequest::new(
            self.config.api_key.clone(),
            self.config.use_cache,
            ImageInput::base64(&bytes),
        );
        let url = self.config.endpoint();

        debug!(url = %url, bytes = bytes.len(), "Submitting image to workflow");

        let response = self.http.post(&url).json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(WorkflowError::RequestFailed {
                status: status.as_u16(),
                body,
            });
        }

        let raw = response.text().await?;
        debug!(raw = %raw, "Workflow raw response");

        let parsed: WorkflowResponse =
            serde_json::from_str(&raw).map_err(|e| WorkflowError::InvalidResponse(e.to_string()))?;

        info!(
            workflow = %self.config.workflow_id,
            outputs = parsed.outputs.len(),
            "Workflow run completed"
        );

        Ok(parsed.outputs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> WorkflowConfig {
        WorkflowConfig {
            api_url: server.uri(),
            api_key: "test-key".to_string(),
            workspace: "ws".to_string(),
            workflow_id: "count".to_string(),
            use_cache: true,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = WorkflowConfig::default();
        assert_eq!(config.api_url, "https://serverless.roboflow.com");
        assert_eq!(config.workflow_id, "detect-count-and-visualize");
        assert!(config.use_cache);
        assert!(!config.has_api_key());
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let config = WorkflowConfig {
            api_url: "http://localhost:9001/".to_string(),
            ..WorkflowConfig::default()
        };
        assert_eq!(
            config.endpoint(),
            "http://localhost:9001/charbels-workspace-dyeep/workflows/detect-count-and-visualize"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = WorkflowConfig {
            api_key: "super-secret".to_string(),
            ..WorkflowConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_run_returns_outputs() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/ws/workflows/count"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "outputs": [{
                    "count_objects": 1,
                    "predictions": {"predictions": [{"x": 4, "y": 4, "width": 2, "height": 2}]}
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = WorkflowClient::new(test_config(&server)).unwrap();
        let outputs = client.run(&RgbImage::new(8, 8)).await.unwrap();

        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].get("count_objects"), Some(&json!(1)));

        let requests = server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        assert_eq!(body["api_key"], "test-key");
        assert_eq!(body["use_cache"], true);
        assert_eq!(body["inputs"]["image"]["type"], "base64");
        assert!(body["inputs"]["image"]["value"].as_str().unwrap().starts_with("/9j/"));
    }

    #[tokio::test]
    async fn test_upstream_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized api_key"))
            .mount(&server)
            .await;

        let client = WorkflowClient::new(test_config(&server)).unwrap();
        let err = client.run(&RgbImage::new(8, 8)).await.unwrap_err();

        match &err {
            WorkflowError::RequestFailed { status, body } => {
                assert_eq!(*status, 401);
                assert_eq!(body, "Unauthorized api_key");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!err.is_local());
    }

    #[tokio::test]
    async fn test_malformed_response_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = WorkflowClient::new(test_config(&server)).unwrap();
        let err = client.run(&RgbImage::new(8, 8)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let config = WorkflowConfig {
            api_url: "http://127.0.0.1:1".to_string(),
            ..WorkflowConfig::default()
        };
        let client = WorkflowClient::new(config).unwrap();
        let err = client.run(&RgbImage::new(8, 8)).await.unwrap_err();
        assert!(matches!(err, WorkflowError::Network(_)));
    }
}
