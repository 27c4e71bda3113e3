//! Service variant definitions.
//!
//! The service ships in two flavours that differ only in how boxes are
//! labelled and how detections are located in the workflow output:
//!
//! - `Numbered`: `#1: 94%` above each box, class name below, fixed nested path
//! - `Combined`: `pill 94%` above each box, heuristic key search

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How detection labels are drawn onto the annotated image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Index + confidence above the box, class name below it.
    Numbered,
    /// A single `class confidence%` label above the box.
    Combined,
}

/// How the detection list is located inside a workflow output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Only `output["predictions"]["predictions"]`.
    Nested,
    /// Conventional keys first, then the first list-valued entry.
    Heuristic,
}

/// Service variant, selected once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ServiceVariant {
    /// Numbered labels, nested extraction.
    #[default]
    Numbered,
    /// Combined labels, heuristic extraction.
    Combined,
}

impl ServiceVariant {
    /// All available variants.
    pub const ALL: &'static [ServiceVariant] = &[ServiceVariant::Numbered, ServiceVariant::Combined];

    /// Returns the variant name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceVariant::Numbered => "numbered",
            ServiceVariant::Combined => "combined",
        }
    }

    pub fn label_style(&self) -> LabelStyle {
        match self {
            ServiceVariant::Numbered => LabelStyle::Numbered,
            ServiceVariant::Combined => LabelStyle::Combined,
        }
    }

    pub fn extraction_mode(&self) -> ExtractionMode {
        match self {
            ServiceVariant::Numbered => ExtractionMode::Nested,
            ServiceVariant::Combined => ExtractionMode::Heuristic,
        }
    }

    /// Read `PILLCOUNT_VARIANT`, defaulting to `numbered` when unset.
    pub fn from_env() -> Result<Self, VariantParseError> {
        match std::env::var("PILLCOUNT_VARIANT") {
            Ok(value) => value.parse(),
            Err(_) => Ok(Self::default()),
        }
    }
}

impl fmt::Display for ServiceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ServiceVariant {
    type Err = VariantParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "numbered" | "a" => Ok(ServiceVariant::Numbered),
            "combined" | "b" => Ok(ServiceVariant::Combined),
            _ => Err(VariantParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
#[error("Unknown service variant: {0}")]
pub struct VariantParseError(String);
