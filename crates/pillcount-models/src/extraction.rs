//! Locating the detection list inside a workflow output.
//!
//! The hosted workflow returns one loosely-shaped mapping per input image.
//! Where the detections live depends on how the workflow was built, so the
//! value under a candidate key is decoded into an explicit [`PredictionsSlot`]
//! and anything unrecognized yields no detections instead of an error.

use serde::de::IgnoredAny;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::detection::Detection;
use crate::variant::ExtractionMode;

/// One per-image output mapping from the workflow response.
pub type WorkflowOutput = Map<String, Value>;

/// Keys tried, in order, by [`ExtractionMode::Heuristic`].
pub const CONVENTIONAL_KEYS: &[&str] = &["predictions", "output", "detections", "model_predictions", "results"];

/// Recognized shapes of a value that may hold detections.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PredictionsSlot {
    /// `[ {...}, ... ]`
    List(Vec<Value>),
    /// `{ "image": {...}, "predictions": [ {...}, ... ] }`
    Nested { predictions: Vec<Value> },
    Other(IgnoredAny),
}

impl PredictionsSlot {
    fn decode(value: &Value) -> Self {
        PredictionsSlot::deserialize(value).unwrap_or(PredictionsSlot::Other(IgnoredAny))
    }
}

/// Extract the detections from a workflow output.
pub fn extract_predictions(output: &WorkflowOutput, mode: ExtractionMode) -> Vec<Detection> {
    let records = match mode {
        ExtractionMode::Nested => nested_records(output),
        ExtractionMode::Heuristic => heuristic_records(output),
    };

    match records {
        Some(records) => decode_records(records),
        None => {
            debug!(?mode, keys = ?output.keys().collect::<Vec<_>>(), "No detections found in workflow output");
            Vec::new()
        }
    }
}

fn nested_records(output: &WorkflowOutput) -> Option<Vec<Value>> {
    match PredictionsSlot::decode(output.get("predictions")?) {
        PredictionsSlot::Nested { predictions } => Some(predictions),
        _ => None,
    }
}

fn heuristic_records(output: &WorkflowOutput) -> Option<Vec<Value>> {
    for key in CONVENTIONAL_KEYS {
        let Some(value) = output.get(*key) else {
            continue;
        };
        match PredictionsSlot::decode(value) {
            PredictionsSlot::List(items) | PredictionsSlot::Nested { predictions: items } => {
                debug!(key = *key, count = items.len(), "Detections found under conventional key");
                return Some(items);
            }
            PredictionsSlot::Other(_) => {}
        }
    }

    output.iter().find_map(|(key, value)| match value {
        Value::Array(items) => {
            debug!(key = %key, count = items.len(), "Detections found by scanning output values");
            Some(items.clone())
        }
        _ => None,
    })
}

fn decode_records(records: Vec<Value>) -> Vec<Detection> {
    records
        .into_iter()
        .filter_map(|record| match record {
            Value::Object(map) => Some(Detection::from(map)),
            other => {
                warn!(record = %other, "Skipping detection record that is not an object");
                None
            }
        })
        .collect()
}
