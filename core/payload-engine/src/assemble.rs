//! FILENAME: core/payload-engine/src/assemble.rs
//! PURPOSE: Pours generated columns, rows and cells into a skeleton copy.
//! CONTEXT: The page expects the exact result shape the analytics engine
//! returns, so headers, data-field lists and stats are rebuilt alongside the
//! matrix. The template itself is left untouched.

use crate::error::SynthesizerError;
use crate::model::{Cell, Column, MinMax, PivotResult, Row, Stats};
use crate::skeleton::SkeletonTemplate;
use query_schema::{Measure, QueryDescriptor};
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Per-measure minimum reported in stats. The page only uses these to scale
/// legends, so fixed placeholders are enough.
pub const PLACEHOLDER_MINIMUM: f64 = 1.0;
pub const PLACEHOLDER_MAXIMUM: f64 = 738.0;

/// A fully synthesized payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Payload {
    /// Template copy with `content.result` regenerated.
    pub skeleton: Value,
    pub result: PivotResult,
    pub measures: Vec<Measure>,
    pub config_json: Value,
}

impl Payload {
    /// The object handed to the page: the skeleton with `measures` and
    /// `configJson` added at the top level.
    pub fn to_json(&self) -> Result<Value, SynthesizerError> {
        let mut value = self.skeleton.clone();
        let obj = value
            .as_object_mut()
            .ok_or_else(|| SynthesizerError::ShapeMismatch("skeleton is not an object".to_string()))?;
        obj.insert("measures".to_string(), serde_json::to_value(&self.measures)?);
        obj.insert("configJson".to_string(), self.config_json.clone());
        Ok(value)
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json()
            .map_err(serde::ser::Error::custom)?
            .serialize(serializer)
    }
}

/// Builds the result fields and writes them into a copy of `template`.
pub fn assemble(
    template: &SkeletonTemplate,
    descriptor: &QueryDescriptor,
    columns: Vec<Column>,
    cell_data: Vec<Vec<Cell>>,
    rows: Vec<Row>,
) -> Result<Payload, SynthesizerError> {
    let data_cols: Vec<_> = descriptor.data_col_hierarchies().collect();
    let columns_headers: Vec<String> = data_cols.iter().map(|h| h.label().to_string()).collect();
    let columns_data_fields: Vec<String> = data_cols.iter().map(|h| h.data_field.clone()).collect();

    let all_data_fields = columns_data_fields
        .iter()
        .chain(descriptor.rows_data_fields.iter())
        .cloned()
        .collect();

    let stats = compute_stats(&cell_data, &descriptor.measures);

    let result = PivotResult {
        columns,
        rows,
        cell_data,
        rows_headers: descriptor.rows_headers.clone(),
        rows_data_fields: descriptor.rows_data_fields.clone(),
        columns_headers,
        columns_data_fields,
        all_data_fields,
        stats,
    };

    let skeleton = template.with_result(&result)?;

    Ok(Payload {
        skeleton,
        result,
        measures: descriptor.measures.clone(),
        config_json: descriptor.config_json.clone(),
    })
}

fn compute_stats(cell_data: &[Vec<Cell>], measures: &[Measure]) -> Stats {
    let mut values = cell_data.iter().flatten().map(|c| c.value);
    let (minimum, maximum) = match values.next() {
        Some(first) => values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v))),
        None => (0.0, 0.0),
    };

    let placeholders: BTreeMap<String, MinMax> = measures
        .iter()
        .map(|m| {
            (
                m.name.clone(),
                MinMax {
                    minimum: PLACEHOLDER_MINIMUM,
                    maximum: PLACEHOLDER_MAXIMUM,
                },
            )
        })
        .collect();

    Stats {
        minimum,
        maximum,
        measure_name_to_min_max_values: placeholders,
    }
}
