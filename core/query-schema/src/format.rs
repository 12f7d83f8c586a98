//! FILENAME: core/query-schema/src/format.rs
//! PURPOSE: Reads per-measure display-format rules out of the Config JSON.
//! CONTEXT: Explore stores number formats keyed by measure name or display
//! name, e.g. `{"COUNT(solved)": {"suffix": "%", "scale": 0.01}}`. The decoder
//! keeps the JSON opaque; the synthesizer only asks whether a measure is a
//! percentage so it can keep fake values inside [0, 1].

use crate::descriptor::Measure;
use serde_json::Value;

/// A display-format rule for one measure.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueFormat {
    pub suffix: Option<String>,
    pub scale: Option<f64>,
    pub limit: Option<f64>,
}

impl ValueFormat {
    fn from_json(entry: &Value) -> Option<Self> {
        let obj = entry.as_object()?;
        Some(ValueFormat {
            suffix: obj.get("suffix").and_then(Value::as_str).map(str::to_string),
            scale: obj.get("scale").and_then(json_number),
            limit: obj.get("limit").and_then(json_number),
        })
    }

    /// `%` suffix combined with a 0.01 scale.
    pub fn is_percentage(&self) -> bool {
        let scaled = self
            .scale
            .map(|s| (s - 0.01).abs() < 1e-9)
            .unwrap_or(false);
        self.suffix.as_deref() == Some("%") && scaled
    }
}

/// Accepts both `0.01` and `"0.01"`.
fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Finds the format rule for a measure, trying its qualified name, display
/// names and data field in that order.
pub fn lookup_format(measure: &Measure, config: &Value) -> Option<ValueFormat> {
    let obj = config.as_object()?;
    [
        measure.name.as_str(),
        measure.display_name.as_str(),
        measure.display_name_without_aggregator.as_str(),
        measure.data_field.as_str(),
    ]
    .iter()
    .find_map(|key| obj.get(*key).and_then(ValueFormat::from_json))
}

/// Whether a measure should be rendered as a percentage.
pub fn is_percentage(measure: &Measure, config: &Value) -> bool {
    if measure.display_name.contains('%') {
        return true;
    }
    lookup_format(measure, config)
        .map(|f| f.is_percentage())
        .unwrap_or(false)
}
