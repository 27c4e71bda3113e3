//! Shared data models for the PillCount service.
//!
//! This crate provides Serde-serializable types for:
//! - Detection records returned by the hosted workflow
//! - Box geometry and label formatting
//! - Locating detections inside a workflow output
//! - Service variant selection (label style + extraction mode)

pub mod detection;
pub mod extraction;
pub mod variant;

// Re-export common types
pub use detection::{format_confidence, BoxCorners, Detection, DEFAULT_CLASS_LABEL};
pub use extraction::{extract_predictions, WorkflowOutput, CONVENTIONAL_KEYS};
pub use variant::{ExtractionMode, LabelStyle, ServiceVariant, VariantParseError};
