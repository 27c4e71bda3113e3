//! Client for the hosted object-detection workflow.
//!
//! The workflow is defined and executed by the provider; this crate only
//! stages an image, submits it by workspace/workflow identifier and returns
//! the raw per-image outputs. Locating detections inside those outputs is
//! left to `pillcount_models::extract_predictions`.

pub mod client;
pub mod error;
pub mod staging;
pub mod types;

pub use client::{WorkflowClient, WorkflowConfig};
pub use error::{WorkflowError, WorkflowResult};
pub use staging::StagedImage;
pub use types::{ImageInput, WorkflowInputs, WorkflowRequest, WorkflowResponse};
