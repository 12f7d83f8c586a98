//! FILENAME: core/payload-engine/src/skeleton.rs
//! PURPOSE: Wraps a captured skeleton template and validates its shape.
//! CONTEXT: A skeleton is the raw JSON result captured from a real dashboard.
//! The synthesizer never edits it; it reads the first column as a clone
//! source and writes regenerated fields into a fresh copy.

use crate::error::SynthesizerError;
use crate::model::{Column, PivotResult};
use serde_json::{Map, Value};

/// A validated skeleton template.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeletonTemplate {
    value: Value,
    first_column: Column,
}

impl SkeletonTemplate {
    /// Validates that `content.result.columns[0]` exists and is a column.
    pub fn from_value(value: Value) -> Result<Self, SynthesizerError> {
        let result = value
            .pointer("/content/result")
            .ok_or_else(|| shape_error("content.result is missing"))?;
        if !result.is_object() {
            return Err(shape_error("content.result is not an object"));
        }

        let first = result
            .pointer("/columns/0")
            .ok_or_else(|| shape_error("content.result.columns[0] is missing"))?;
        let first_column: Column = serde_json::from_value(first.clone())
            .map_err(|e| shape_error(&format!("content.result.columns[0] is not a column: {}", e)))?;

        Ok(SkeletonTemplate { value, first_column })
    }

    /// Structural clone source for generated columns.
    pub fn first_column(&self) -> &Column {
        &self.first_column
    }

    pub fn as_value(&self) -> &Value {
        &self.value
    }

    /// Returns a copy of the template with `result` written over
    /// `content.result`. Fields of the old result that `PivotResult` does not
    /// model are kept, and `stats` is merged one level deeper.
    pub(crate) fn with_result(&self, result: &PivotResult) -> Result<Value, SynthesizerError> {
        let mut value = self.value.clone();
        let target = value
            .pointer_mut("/content/result")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| shape_error("content.result is not an object"))?;

        let Value::Object(generated) = serde_json::to_value(result)? else {
            return Err(shape_error("generated result is not an object"));
        };

        for (key, new_value) in generated {
            if key == "stats" {
                if let (Some(Value::Object(old_stats)), Value::Object(new_stats)) =
                    (target.get_mut("stats"), &new_value)
                {
                    merge_into(old_stats, new_stats);
                    continue;
                }
            }
            target.insert(key, new_value);
        }

        Ok(value)
    }
}

fn merge_into(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, value) in source {
        target.insert(key.clone(), value.clone());
    }
}

fn shape_error(message: &str) -> SynthesizerError {
    SynthesizerError::ShapeMismatch(message.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template() -> Value {
        json!({
            "id": "query-1",
            "content": {
                "result": {
                    "columns": [{ "members": [{ "name": "x", "displayName": "X" }] }],
                    "cellData": [[{ "value": 3 }]],
                    "resultId": "abc",
                    "stats": { "minimum": 3, "maximum": 3, "sum": 3 }
                },
                "status": "ok"
            }
        })
    }

    #[test]
    fn test_accepts_valid_template() {
        let t = SkeletonTemplate::from_value(template()).unwrap();
        assert_eq!(t.first_column().members[0].name, "x");
    }

    #[test]
    fn test_rejects_missing_result() {
        let err = SkeletonTemplate::from_value(json!({ "content": {} })).unwrap_err();
        assert!(matches!(err, SynthesizerError::ShapeMismatch(_)));
    }

    #[test]
    fn test_rejects_empty_columns() {
        let err = SkeletonTemplate::from_value(json!({ "content": { "result": { "columns": [] } } }))
            .unwrap_err();
        assert!(matches!(err, SynthesizerError::ShapeMismatch(_)));
    }

    #[test]
    fn test_rejects_column_without_members() {
        let err = SkeletonTemplate::from_value(json!({ "content": { "result": { "columns": [{ "key": 1 }] } } }))
            .unwrap_err();
        assert!(matches!(err, SynthesizerError::ShapeMismatch(_)));
    }

    #[test]
    fn test_with_result_keeps_unmodelled_fields_and_leaves_template_alone() {
        let t = SkeletonTemplate::from_value(template()).unwrap();
        let out = t.with_result(&PivotResult::default()).unwrap();

        assert_eq!(out["id"], "query-1");
        assert_eq!(out["content"]["status"], "ok");
        assert_eq!(out["content"]["result"]["resultId"], "abc");
        assert_eq!(out["content"]["result"]["stats"]["sum"], 3);
        assert_eq!(out["content"]["result"]["stats"]["maximum"], 0.0);
        assert_eq!(out["content"]["result"]["cellData"], json!([]));

        // The template itself is untouched.
        assert_eq!(t.as_value(), &template());
    }
}
