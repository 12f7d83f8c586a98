//! FILENAME: core/query-schema/src/lib.rs
//! PURPOSE: Library root for the DemoLens query schema decoder.
//! CONTEXT: A captured Explore dashboard stores each query as a compact
//! schema: an XML `<Query>` document, gzip-compressed and base64-encoded.
//! This crate turns that blob back into a typed `QueryDescriptor` that the
//! payload engine expands into fake pivot data.
//!
//! PIPELINE: base64 --> gzip --> UTF-8 XML --> element tree --> QueryDescriptor
//!
//! Layers:
//! - `xml`: Minimal element tree built on quick-xml events
//! - `descriptor`: The decoded, immutable query description
//! - `format`: Value-format rules (percentage detection) read from Config JSON
//! - `decoder`: The decode pipeline and the matching encoder

pub mod decoder;
pub mod descriptor;
pub mod error;
pub mod format;
pub mod xml;


pub use decoder::{decode, decode_with_rng, encode_config, encode_schema, inflate_schema};
pub use descriptor::{
    Aggregator, Axis, DecodeOptions, GridRule, Hierarchy, Measure, QueryDescriptor,
    DEFAULT_TIME_POINTS, TIME_UNIT_DAY,
};
pub use error::DecodeError;
pub use format::{is_percentage, lookup_format, ValueFormat};
