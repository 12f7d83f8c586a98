//! FILENAME: core/payload-engine/src/model.rs
//! Pivot Result Model - The serializable shape injected into the live page.
//!
//! These types mirror the analytics engine's pivot result (camelCase on the
//! wire). Column and row entries keep any field we do not model in `extra`, so
//! a captured template's legacy keys survive regeneration untouched.

use query_schema::Aggregator;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::collections::BTreeMap;

// ============================================================================
// MEMBERS & TUPLES
// ============================================================================

/// One member of a column or row tuple: a hierarchy level value, or (as the
/// last member of a column) the measure itself.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_field: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level_display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<String>,

    // Measure metadata (only on the final member of a column)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<Aggregator>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name_without_aggregator: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u32>,

    /// Fields carried over verbatim from the template.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Member {
    pub fn is_measure(&self) -> bool {
        self.aggregator.is_some()
    }
}

/// An ordered list of members: one column header or one row header.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AxisTuple {
    pub members: SmallVec<[Member; 4]>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

pub type Column = AxisTuple;
pub type Row = AxisTuple;

/// A single data cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub value: f64,
}

// ============================================================================
// RESULT & STATS
// ============================================================================

/// Placeholder min/max reported per measure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMax {
    pub minimum: f64,
    pub maximum: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub minimum: f64,
    pub maximum: f64,
    pub measure_name_to_min_max_values: BTreeMap<String, MinMax>,
}

/// Every field the assembler writes into `content.result`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotResult {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub cell_data: Vec<Vec<Cell>>,
    pub rows_headers: Vec<String>,
    pub rows_data_fields: Vec<String>,
    pub columns_headers: Vec<String>,
    pub columns_data_fields: Vec<String>,
    pub all_data_fields: Vec<String>,
    pub stats: Stats,
}

// ============================================================================
// LIGHT PAYLOAD
// ============================================================================

/// A saved label of one member. Only the fields a user can edit are kept.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightMember {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightTuple {
    #[serde(default)]
    pub members: Vec<LightMember>,
}

/// Label-only snapshot of a payload's columns and rows. Merged back by
/// position on the next inflate so user edits survive regeneration.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LightPayload {
    #[serde(default)]
    pub columns: Vec<LightTuple>,

    #[serde(default)]
    pub rows: Vec<LightTuple>,
}

impl LightPayload {
    /// Captures the current labels of a generated result.
    pub fn from_result(result: &PivotResult) -> Self {
        LightPayload {
            columns: result.columns.iter().map(LightTuple::from_tuple).collect(),
            rows: result.rows.iter().map(LightTuple::from_tuple).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.rows.is_empty()
    }
}

impl LightTuple {
    fn from_tuple(tuple: &AxisTuple) -> Self {
        LightTuple {
            members: tuple
                .members
                .iter()
                .map(|m| LightMember {
                    name: Some(m.name.clone()),
                    display_name: Some(m.display_name.clone()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_member_keeps_unknown_fields() {
        let raw = json!({
            "name": "2024-01-01",
            "displayName": "2024-01-01",
            "levelDisplayName": "Date",
            "uniqueKey": "[Date].[2024-01-01]",
            "isTotal": false
        });
        let member: Member = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(member.extra.get("uniqueKey"), Some(&json!("[Date].[2024-01-01]")));
        assert_eq!(serde_json::to_value(&member).unwrap(), raw);
    }

    #[test]
    fn test_tuple_roundtrips_legacy_fields() {
        let raw = json!({ "members": [{ "name": "a", "displayName": "A" }], "key": "c0" });
        let tuple: AxisTuple = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(tuple.members.len(), 1);
        assert_eq!(serde_json::to_value(&tuple).unwrap(), raw);
    }

    #[test]
    fn test_result_uses_camel_case() {
        let value = serde_json::to_value(PivotResult::default()).unwrap();
        assert!(value.get("cellData").is_some());
        assert!(value.get("allDataFields").is_some());
        assert!(value["stats"].get("measureNameToMinMaxValues").is_some());
    }

    #[test]
    fn test_light_payload_captures_labels() {
        let mut result = PivotResult::default();
        result.columns.push(AxisTuple {
            members: smallvec::smallvec![Member {
                name: "Category 1".to_string(),
                display_name: "Email".to_string(),
                ..Default::default()
            }],
            extra: Map::new(),
        });

        let light = LightPayload::from_result(&result);
        assert_eq!(light.columns.len(), 1);
        assert_eq!(light.columns[0].members[0].display_name.as_deref(), Some("Email"));
        assert!(light.rows.is_empty());
        assert!(!light.is_empty());
    }
}
