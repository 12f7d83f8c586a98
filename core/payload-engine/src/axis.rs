//! FILENAME: core/payload-engine/src/axis.rs
//! Column/Row Builder - Expands hierarchy descriptors into concrete tuples.
//!
//! Algorithm:
//! 1. Decide how many axis points to emit (time, category or grid)
//! 2. Generate one label per point (calendar days or category names)
//! 3. For every label, emit one column per measure; each column holds one
//!    member per column hierarchy plus the measure member
//! 4. Rows get one member per row hierarchy with a numbered display name
//! 5. Saved ("light") labels are merged back by position

use crate::model::{AxisTuple, Column, LightTuple, Member, Row};
use crate::profile::VisualizationProfile;
use crate::skeleton::SkeletonTemplate;
use chrono::{Days, NaiveDate};
use query_schema::{Axis, Hierarchy, Measure, QueryDescriptor};
use serde_json::Map;
use smallvec::SmallVec;

/// Time axes never show fewer days than this.
pub const MIN_TIME_POINTS: usize = 10;

// ============================================================================
// POINT COUNT
// ============================================================================

/// Number of axis labels to generate.
///
/// A prior column count (from a previous inflate of the same skeleton) wins
/// over the descriptor's hint so saved labels stay aligned by position.
pub fn column_points(descriptor: &QueryDescriptor, prior_column_count: Option<usize>) -> usize {
    if descriptor.is_grid {
        return 1;
    }

    let measures = descriptor.measures.len().max(1);
    if let Some(prior) = prior_column_count.filter(|n| *n > 0) {
        return (prior / measures).max(1);
    }

    match &descriptor.axis {
        Axis::Time { points, .. } => (*points).max(MIN_TIME_POINTS),
        Axis::Category { points } => *points,
    }
}

/// `count` consecutive `YYYY-MM-DD` labels ending on `today`.
fn day_labels(count: usize, today: NaiveDate) -> Vec<String> {
    (0..count)
        .rev()
        .map(|offset| {
            today
                .checked_sub_days(Days::new(offset as u64))
                .unwrap_or(today)
                .format("%Y-%m-%d")
                .to_string()
        })
        .collect()
}

// ============================================================================
// COLUMNS
// ============================================================================

/// Builds the column tuples for a descriptor.
/// Every column is cloned from the template's first column, so template-level
/// fields the synthesizer does not know about are kept.
pub fn build_columns(
    descriptor: &QueryDescriptor,
    template: &SkeletonTemplate,
    prior_column_count: Option<usize>,
    profile: VisualizationProfile,
    today: NaiveDate,
) -> Vec<Column> {
    let base = template.first_column();
    let points = column_points(descriptor, prior_column_count);

    let labels: Vec<String> = match &descriptor.axis {
        Axis::Time { .. } if !descriptor.is_grid => day_labels(points, today),
        _ => (0..points).map(|i| profile.category_label(i)).collect(),
    };

    let mut columns = Vec::with_capacity(labels.len() * descriptor.measures.len());
    for label in &labels {
        for measure in &descriptor.measures {
            let mut members: SmallVec<[Member; 4]> = descriptor
                .col_hierarchies
                .iter()
                .enumerate()
                .map(|(level, h)| hierarchy_member(base.members.get(level), h, label))
                .collect();
            members.push(measure_member(base.members.last(), measure));

            columns.push(AxisTuple {
                members,
                extra: base.extra.clone(),
            });
        }
    }

    columns
}

/// Member for one hierarchy level. Only the template member's unknown fields
/// are inherited; everything we model is regenerated.
fn hierarchy_member(template: Option<&Member>, hierarchy: &Hierarchy, label: &str) -> Member {
    Member {
        name: label.to_string(),
        display_name: label.to_string(),
        attribute_name: Some(hierarchy.name.clone()),
        data_field: Some(hierarchy.data_field.clone()),
        level_display_name: Some(hierarchy.label().to_string()),
        hierarchy_name: Some(hierarchy.name.clone()),
        dimension: Some(hierarchy.dimension.clone()),
        extra: inherited_extra(template),
        ..Default::default()
    }
}

fn measure_member(template: Option<&Member>, measure: &Measure) -> Member {
    Member {
        name: measure.name.clone(),
        display_name: measure.display_name.clone(),
        attribute_name: Some(measure.name.clone()),
        data_field: Some(measure.data_field.clone()),
        level_display_name: Some(measure.display_name_without_aggregator.clone()),
        hierarchy_name: Some("Measures".to_string()),
        dimension: None,
        aggregator: Some(measure.aggregator.clone()),
        display_name_without_aggregator: Some(measure.display_name_without_aggregator.clone()),
        unique_name: Some(measure.unique_name.clone()),
        position: Some(measure.position),
        extra: inherited_extra(template),
    }
}

fn inherited_extra(template: Option<&Member>) -> Map<String, serde_json::Value> {
    template.map(|m| m.extra.clone()).unwrap_or_default()
}

// ============================================================================
// ROWS
// ============================================================================

/// Builds `row_count` row tuples, one member per row hierarchy.
pub fn build_rows(descriptor: &QueryDescriptor, row_count: usize) -> Vec<Row> {
    (0..row_count)
        .map(|index| AxisTuple {
            members: descriptor
                .row_hierarchies
                .iter()
                .map(|h| row_member(h, index))
                .collect(),
            extra: Map::new(),
        })
        .collect()
}

fn row_member(hierarchy: &Hierarchy, index: usize) -> Member {
    let label = match hierarchy.display_name.as_deref() {
        Some(display) => format!("{} {}", display, index + 1),
        None => "row all".to_string(),
    };
    Member {
        name: label.clone(),
        display_name: label,
        attribute_name: Some(hierarchy.name.clone()),
        data_field: Some(hierarchy.data_field.clone()),
        level_display_name: Some(hierarchy.label().to_string()),
        hierarchy_name: Some(hierarchy.name.clone()),
        dimension: Some(hierarchy.dimension.clone()),
        ..Default::default()
    }
}

// ============================================================================
// LIGHT MERGE
// ============================================================================

/// Overlays saved column labels by position. Saved `name`/`displayName` win;
/// every other generated field is kept.
pub fn merge_light_columns(columns: &mut [Column], light: &[LightTuple]) {
    merge_light(columns, light);
}

/// Overlays saved row labels by position.
pub fn merge_light_rows(rows: &mut [Row], light: &[LightTuple]) {
    merge_light(rows, light);
}

fn merge_light(tuples: &mut [AxisTuple], light: &[LightTuple]) {
    for (tuple, saved) in tuples.iter_mut().zip(light) {
        for (member, saved_member) in tuple.members.iter_mut().zip(&saved.members) {
            if let Some(name) = &saved_member.name {
                member.name = name.clone();
            }
            if let Some(display_name) = &saved_member.display_name {
                member.display_name = display_name.clone();
            }
        }
    }
}
