//! Application state.

use std::sync::Arc;

use pillcount_media::{Annotator, LabelFont};
use pillcount_workflow::WorkflowClient;

use crate::config::ApiConfig;

/// Shared application state. Read-only after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub workflow: Arc<WorkflowClient>,
    pub annotator: Arc<Annotator>,
}

impl AppState {
    /// Create application state; the annotator follows the configured variant.
    pub fn new(config: ApiConfig, workflow: WorkflowClient, font: LabelFont) -> Self {
        let annotator = Annotator::new(font, config.variant.label_style());
        Self {
            config,
            workflow: Arc::new(workflow),
            annotator: Arc::new(annotator),
        }
    }

    /// Create state with the workflow client and label font taken from the environment.
    pub fn from_env(config: ApiConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let workflow = WorkflowClient::from_env()?;
        Ok(Self::new(config, workflow, LabelFont::from_env()))
    }
}
