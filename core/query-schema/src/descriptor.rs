//! FILENAME: core/query-schema/src/descriptor.rs
//! Query Descriptor - The decoded form of a captured query schema.
//!
//! These structures describe WHAT a captured query looks like (measures,
//! hierarchies, axis classification, display config). They are produced once
//! per decode and never mutated afterwards.

use serde::{Deserialize, Serialize};

/// Unit used for time axes. Explore schemas captured by DemoLens are always
/// re-expanded at day granularity.
pub const TIME_UNIT_DAY: &str = "day";

/// Number of points requested for a time axis when the caller gives none.
pub const DEFAULT_TIME_POINTS: usize = 5;

// ============================================================================
// AGGREGATION
// ============================================================================

/// Aggregation applied to a measure in the source query.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Aggregator {
    Sum,
    Count,
    DistinctCount,
    Average,
    Median,
    /// Any aggregation the synthesizer has no formatting rule for.
    Other(String),
}

impl Aggregator {
    /// Parses the `aggregationType` attribute. Matching is case-insensitive.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "SUM" => Aggregator::Sum,
            "COUNT" => Aggregator::Count,
            "D_COUNT" | "DCOUNT" | "DISTINCT_COUNT" => Aggregator::DistinctCount,
            "AVG" | "AVERAGE" => Aggregator::Average,
            "MED" | "MEDIAN" => Aggregator::Median,
            _ => Aggregator::Other(raw.trim().to_string()),
        }
    }

    /// The wire spelling used in measure names, e.g. `SUM` in `SUM(field)`.
    pub fn as_str(&self) -> &str {
        match self {
            Aggregator::Sum => "SUM",
            Aggregator::Count => "COUNT",
            Aggregator::DistinctCount => "D_COUNT",
            Aggregator::Average => "AVG",
            Aggregator::Median => "MED",
            Aggregator::Other(s) => s.as_str(),
        }
    }

    /// Whether values of this aggregation are whole numbers.
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            Aggregator::Sum | Aggregator::Count | Aggregator::DistinctCount
        )
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Aggregator::Sum
    }
}

impl From<String> for Aggregator {
    fn from(raw: String) -> Self {
        Aggregator::parse(&raw)
    }
}

impl From<Aggregator> for String {
    fn from(agg: Aggregator) -> Self {
        agg.as_str().to_string()
    }
}

impl std::fmt::Display for Aggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// MEASURES & HIERARCHIES
// ============================================================================

/// A measure (value field) of the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub aggregator: Aggregator,

    /// Source field key, e.g. `tickets`.
    pub data_field: String,

    /// Aggregator-qualified label, e.g. `COUNT(Tickets)`.
    pub display_name: String,

    /// Label without the aggregator, e.g. `Tickets`.
    pub display_name_without_aggregator: String,

    /// Aggregator-qualified field key, e.g. `COUNT(tickets)`.
    pub name: String,

    pub unique_name: String,

    pub position: u32,
}

impl Measure {
    /// Builds a measure from its raw schema attributes.
    /// A display name that is already aggregator-qualified (`SUM(x)`) is
    /// stripped before being re-qualified so it never doubles up.
    pub fn new(aggregator: Aggregator, data_field: &str, display_name: &str, position: u32) -> Self {
        let label = strip_aggregator(display_name);
        let label = if label.is_empty() { data_field } else { label };
        let name = format!("{}({})", aggregator, data_field);

        Measure {
            display_name: format!("{}({})", aggregator, label),
            display_name_without_aggregator: label.to_string(),
            unique_name: format!("[Measures].[{}]", name),
            name,
            data_field: data_field.to_string(),
            aggregator,
            position,
        }
    }
}

/// Strips a leading `AGG(` ... `)` wrapper from a label.
/// "SUM(Tickets)" -> "Tickets", "Tickets" -> "Tickets"
pub(crate) fn strip_aggregator(label: &str) -> &str {
    let label = label.trim();
    let Some(open) = label.find('(') else {
        return label;
    };
    let prefix = &label[..open];
    let qualified = !prefix.is_empty()
        && prefix.chars().all(|c| c.is_ascii_uppercase() || c == '_')
        && label.ends_with(')');
    if qualified {
        label[open + 1..label.len() - 1].trim()
    } else {
        label
    }
}

/// A dimension attached to the column or row axis of the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hierarchy {
    pub name: String,
    pub display_name: Option<String>,
    pub dimension: String,
    pub dimension_type: String,
    pub data_field: String,
    #[serde(default)]
    pub is_time: bool,
}

impl Hierarchy {
    /// Name of the sentinel hierarchy standing in for "no hierarchy".
    pub const ALL: &'static str = "all";

    /// The sentinel "all" hierarchy.
    pub fn all() -> Self {
        Hierarchy {
            name: Self::ALL.to_string(),
            display_name: None,
            dimension: Self::ALL.to_string(),
            dimension_type: Self::ALL.to_string(),
            data_field: Self::ALL.to_string(),
            is_time: false,
        }
    }

    pub fn is_all(&self) -> bool {
        self.name == Self::ALL
    }

    pub fn is_time_dimension(&self) -> bool {
        self.is_time || self.dimension_type.eq_ignore_ascii_case("time")
    }

    /// Label used in headers: the display name, falling back to the name.
    pub fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

// ============================================================================
// AXIS CLASSIFICATION
// ============================================================================

/// Which expansion strategy the column builder uses, with its cardinality hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "axis", rename_all = "camelCase")]
pub enum Axis {
    Time { unit: String, points: usize },
    Category { points: usize },
}

impl Axis {
    pub fn points(&self) -> usize {
        match self {
            Axis::Time { points, .. } | Axis::Category { points } => *points,
        }
    }

    pub fn is_time(&self) -> bool {
        matches!(self, Axis::Time { .. })
    }
}

/// Predicate deciding which queries render as grids (one column per measure,
/// several data rows). The Explore and Admin dashboards disagree slightly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GridRule {
    /// `simpleGrid2`, or `autoChart` with more than one row hierarchy or measure.
    #[default]
    Explore,
    /// `simpleGrid2` or `table`, or `autoChart` with more than one measure.
    Admin,
}

impl GridRule {
    pub fn is_grid(&self, visualization_type: &str, row_hierarchies: usize, measures: usize) -> bool {
        let vt = visualization_type;
        match self {
            GridRule::Explore => {
                vt.eq_ignore_ascii_case("simpleGrid2")
                    || (vt.eq_ignore_ascii_case("autoChart") && (row_hierarchies > 1 || measures > 1))
            }
            GridRule::Admin => {
                vt.eq_ignore_ascii_case("simpleGrid2")
                    || vt.eq_ignore_ascii_case("table")
                    || (vt.eq_ignore_ascii_case("autoChart") && measures > 1)
            }
        }
    }
}

/// Caller-supplied knobs for a decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Overrides the point count for time axes and random category axes.
    pub initial_points: Option<usize>,
    pub grid_rule: GridRule,
}

// ============================================================================
// MAIN DESCRIPTOR
// ============================================================================

/// The fully decoded query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub visualization_type: String,
    pub measures: Vec<Measure>,
    pub axis: Axis,
    pub is_grid: bool,
    pub col_hierarchies: Vec<Hierarchy>,
    pub row_hierarchies: Vec<Hierarchy>,
    pub config_json: serde_json::Value,
    pub rows_headers: Vec<String>,
    pub rows_data_fields: Vec<String>,
}

impl QueryDescriptor {
    /// Column hierarchies other than the "all" sentinel.
    pub fn data_col_hierarchies(&self) -> impl Iterator<Item = &Hierarchy> {
        self.col_hierarchies.iter().filter(|h| !h.is_all())
    }

    /// Row hierarchies other than the "all" sentinel.
    pub fn data_row_hierarchies(&self) -> impl Iterator<Item = &Hierarchy> {
        self.row_hierarchies.iter().filter(|h| !h.is_all())
    }

    /// True when more than one real row hierarchy is present.
    pub fn has_multi_row_hierarchy(&self) -> bool {
        self.data_row_hierarchies().count() > 1
    }
}
