//! FILENAME: core/payload-engine/src/lib.rs
//! Payload synthesizer for DemoLens.
//!
//! This crate regenerates a pivot-table-shaped result (columns, rows,
//! cellData, headers, stats) from a decoded query schema, so a captured
//! dashboard can be replayed with masked data. It depends on `query-schema`
//! for the decoded `QueryDescriptor`.
//!
//! Layers:
//! - `model`: Serializable pivot result types (what the page renders)
//! - `skeleton`: The captured template a payload is poured into
//! - `profile`: Per-dashboard constants (Explore vs Admin)
//! - `masking`: Fake value series with a chosen statistical shape
//! - `axis`: Column and row expansion
//! - `cells`: Cell data matrix
//! - `assemble`: Final payload object
//! - `engine`: The inflate pipeline tying the layers together

pub mod assemble;
pub mod axis;
pub mod cells;
pub mod engine;
pub mod error;
pub mod masking;
pub mod model;
pub mod profile;
pub mod skeleton;


pub use assemble::{assemble, Payload, PLACEHOLDER_MAXIMUM, PLACEHOLDER_MINIMUM};
pub use axis::{
    build_columns, build_rows, column_points, merge_light_columns, merge_light_rows,
    MIN_TIME_POINTS,
};
pub use cells::{build_cell_data, data_row_count, fake_value, GRID_ROW_COUNT};
pub use engine::{inflate_payload, InflateRequest, PayloadInflater};
pub use error::SynthesizerError;
pub use masking::{generate, MaskingPreset, NoiseBands, RangeBound, ValueShapeConfig};
pub use model::{
    AxisTuple, Cell, Column, LightMember, LightPayload, LightTuple, Member, MinMax, PivotResult,
    Row, Stats,
};
pub use profile::VisualizationProfile;
pub use skeleton::SkeletonTemplate;
