//! Detection records reported by the hosted workflow.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Value};

/// Label used when a detection carries no class name.
pub const DEFAULT_CLASS_LABEL: &str = "pill";

/// One object instance in center-form box coordinates.
///
/// The record is external data. The provider's mapping is kept untouched and
/// serialized back as-is; the typed fields are a read-only view used for
/// drawing, where values of the wrong JSON type read as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "Map<String, Value>")]
pub struct Detection {
    x: Option<f64>,
    y: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
    confidence: Option<f64>,
    class_name: Option<String>,
    raw: Map<String, Value>,
}

impl From<Map<String, Value>> for Detection {
    fn from(raw: Map<String, Value>) -> Self {
        let number = |key: &str| raw.get(key).and_then(Value::as_f64);
        let class_name = match raw.get("class") {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        };
        Self {
            x: number("x"),
            y: number("y"),
            width: number("width"),
            height: number("height"),
            confidence: number("confidence"),
            class_name,
            raw,
        }
    }
}

impl Serialize for Detection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl Detection {
    /// Create a detection with all known fields set.
    pub fn new(x: f64, y: f64, width: f64, height: f64, confidence: f64, class_name: impl Into<String>) -> Self {
        let mut raw = Map::new();
        raw.insert("x".into(), x.into());
        raw.insert("y".into(), y.into());
        raw.insert("width".into(), width.into());
        raw.insert("height".into(), height.into());
        raw.insert("confidence".into(), confidence.into());
        raw.insert("class".into(), Value::String(class_name.into()));
        Self::from(raw)
    }

    /// The record exactly as the provider sent it.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn center_x(&self) -> f64 {
        self.x.unwrap_or(0.0)
    }

    pub fn center_y(&self) -> f64 {
        self.y.unwrap_or(0.0)
    }

    pub fn box_width(&self) -> f64 {
        self.width.unwrap_or(0.0)
    }

    pub fn box_height(&self) -> f64 {
        self.height.unwrap_or(0.0)
    }

    pub fn confidence(&self) -> Option<f64> {
        self.confidence
    }

    pub fn confidence_or_zero(&self) -> f64 {
        self.confidence.unwrap_or(0.0)
    }

    /// Class label, falling back to [`DEFAULT_CLASS_LABEL`].
    pub fn label(&self) -> &str {
        self.class_name.as_deref().unwrap_or(DEFAULT_CLASS_LABEL)
    }

    /// Corner-form box for this detection.
    pub fn corners(&self) -> BoxCorners {
        BoxCorners::from_center(self.center_x(), self.center_y(), self.box_width(), self.box_height())
    }
}

/// Axis-aligned box in corner form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxCorners {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoxCorners {
    /// Convert a center-form box to corners.
    pub fn from_center(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x0: x - width / 2.0,
            y0: y - height / 2.0,
            x1: x + width / 2.0,
            y1: y + height / 2.0,
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// Render a confidence in [0, 1] as a rounded integer percentage, e.g. `94%`.
pub fn format_confidence(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_corners_from_center() {
        let corners = BoxCorners::from_center(100.0, 50.0, 40.0, 20.0);
        assert_eq!(corners, BoxCorners { x0: 80.0, y0: 40.0, x1: 120.0, y1: 60.0 });
        assert_eq!(corners.width(), 40.0);
        assert_eq!(corners.height(), 20.0);
    }

    #[test]
    fn test_corners_odd_extent() {
        let corners = BoxCorners::from_center(10.5, 7.25, 3.0, 0.5);
        assert_eq!(corners.x0, 9.0);
        assert_eq!(corners.x1, 12.0);
        assert_eq!(corners.y0, 7.0);
        assert_eq!(corners.y1, 7.5);
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.9432), "94%");
        assert_eq!(format_confidence(0.0), "0%");
        assert_eq!(format_confidence(1.0), "100%");
        assert_eq!(format_confidence(0.876), "88%");
    }

    #[test]
    fn test_missing_fields_default() {
        let detection: Detection = serde_json::from_value(json!({})).unwrap();
        assert_eq!(detection.center_x(), 0.0);
        assert_eq!(detection.confidence_or_zero(), 0.0);
        assert_eq!(detection.label(), DEFAULT_CLASS_LABEL);
        assert_eq!(detection.corners(), BoxCorners { x0: 0.0, y0: 0.0, x1: 0.0, y1: 0.0 });
    }

    #[test]
    fn test_wrong_types_decode_as_absent() {
        let detection: Detection = serde_json::from_value(json!({
            "x": "twelve",
            "y": null,
            "width": 4,
            "class": ["capsule"]
        }))
        .unwrap();
        assert_eq!(detection.center_x(), 0.0);
        assert_eq!(detection.center_y(), 0.0);
        assert_eq!(detection.box_width(), 4.0);
        assert_eq!(detection.label(), "pill");
    }

    #[test]
    fn test_record_is_echoed_unchanged() {
        let input = json!({
            "x": 12.0,
            "y": 8.0,
            "width": 4.0,
            "height": 6.0,
            "confidence": 0.91,
            "class": "capsule",
            "class_id": 2,
            "detection_id": "4b1f"
        });
        let detection: Detection = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(detection.label(), "capsule");
        assert_eq!(detection.raw().get("class_id"), Some(&json!(2)));
        assert_eq!(serde_json::to_value(&detection).unwrap(), input);
    }

    #[test]
    fn test_odd_field_types_survive_serialization() {
        let input = json!({
            "class": 3,
            "confidence": "high",
            "height": 10,
            "width": 10,
            "x": 20,
            "y": 20
        });
        let detection: Detection = serde_json::from_value(input.clone()).unwrap();
        assert_eq!(detection.label(), "3");
        assert_eq!(detection.confidence(), None);
        assert_eq!(detection.box_width(), 10.0);
        assert_eq!(serde_json::to_value(&detection).unwrap(), input);
        assert_eq!(serde_json::to_string(&detection).unwrap(), input.to_string());
    }
}
