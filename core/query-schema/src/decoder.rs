//! FILENAME: core/query-schema/src/decoder.rs
//! PURPOSE: Decodes a base64 + gzip query schema into a `QueryDescriptor`.
//! CONTEXT: This is the first stage of the inflate pipeline. Its output feeds
//! the column/row builders and the value generator in `payload-engine`.
//!
//! SCHEMA LAYOUT:
//!   <Query>
//!     <Measures><Measure dataField aggregationType displayName position/>*</Measures>
//!     <Columns><Hierarchy hierarchyName hierarchyDisplayName dimension
//!              dimensionType dataField isTime/>*</Columns>
//!     <Rows><Hierarchy .../>*</Rows>
//!     <Config json="base64 JSON"/>
//!   </Query>

use crate::descriptor::{
    Aggregator, Axis, DecodeOptions, Hierarchy, Measure, QueryDescriptor, DEFAULT_TIME_POINTS,
    TIME_UNIT_DAY,
};
use crate::error::DecodeError;
use crate::xml::{parse_document, XmlElement};
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, STANDARD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use rand::Rng;
use std::io::{Read, Write};

/// Captured schemas come from several page scripts; some drop the padding.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ============================================================================
// PUBLIC API
// ============================================================================

/// Decodes a schema using the thread-local RNG for random category sizes.
pub fn decode(
    schema: &str,
    visualization_type: &str,
    options: &DecodeOptions,
) -> Result<QueryDescriptor, DecodeError> {
    decode_with_rng(schema, visualization_type, options, &mut rand::thread_rng())
}

/// Decodes a schema, drawing any random point counts from `rng`.
pub fn decode_with_rng<R: Rng>(
    schema: &str,
    visualization_type: &str,
    options: &DecodeOptions,
    rng: &mut R,
) -> Result<QueryDescriptor, DecodeError> {
    let xml = inflate_schema(schema)?;
    let root = parse_document(&xml)?;

    if root.name != "Query" {
        return Err(DecodeError::MissingElement("Query".to_string()));
    }

    let measures_el = required_child(&root, "Measures")?;
    let columns_el = required_child(&root, "Columns")?;
    let rows_el = required_child(&root, "Rows")?;
    let config_el = required_child(&root, "Config")?;

    let measures = parse_measures(measures_el)?;
    let col_hierarchies = parse_hierarchies(columns_el);
    let row_hierarchies = parse_hierarchies(rows_el);
    let config_json = parse_config(config_el)?;

    let data_rows: Vec<&Hierarchy> = row_hierarchies.iter().filter(|h| !h.is_all()).collect();
    let rows_headers = data_rows.iter().map(|h| h.label().to_string()).collect();
    let rows_data_fields = data_rows.iter().map(|h| h.data_field.clone()).collect();

    let (axis, is_grid) = classify(
        visualization_type,
        &measures,
        &col_hierarchies,
        data_rows.len(),
        options,
        rng,
    );

    Ok(QueryDescriptor {
        visualization_type: visualization_type.to_string(),
        measures,
        axis,
        is_grid,
        col_hierarchies,
        row_hierarchies,
        config_json,
        rows_headers,
        rows_data_fields,
    })
}

/// Reverses the transport encoding: base64 --> gzip --> UTF-8 XML text.
pub fn inflate_schema(schema: &str) -> Result<String, DecodeError> {
    let compact: String = schema.chars().filter(|c| !c.is_whitespace()).collect();
    let compressed = LENIENT_BASE64
        .decode(compact.as_bytes())
        .map_err(|e| DecodeError::InvalidBase64(e.to_string()))?;

    let mut decoder = GzDecoder::new(compressed.as_slice());
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|e| DecodeError::InvalidGzip(e.to_string()))?;

    String::from_utf8(raw).map_err(|e| DecodeError::InvalidUtf8(e.to_string()))
}

/// Encodes an XML schema the way the page stores it: gzip, then base64.
pub fn encode_schema(xml: &str) -> String {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    // Writing into a Vec cannot fail.
    let _ = encoder.write_all(xml.as_bytes());
    let compressed = encoder.finish().unwrap_or_default();
    STANDARD.encode(compressed)
}

/// Encodes a format-rule object for the `Config@json` attribute.
pub fn encode_config(config: &serde_json::Value) -> String {
    STANDARD.encode(config.to_string())
}

// ============================================================================
// ELEMENT PARSING
// ============================================================================

fn required_child<'a>(root: &'a XmlElement, name: &str) -> Result<&'a XmlElement, DecodeError> {
    root.child(name)
        .ok_or_else(|| DecodeError::MissingElement(name.to_string()))
}

fn parse_measures(measures_el: &XmlElement) -> Result<Vec<Measure>, DecodeError> {
    measures_el
        .children_named("Measure")
        .enumerate()
        .map(|(index, el)| {
            let data_field = el.attr("dataField").ok_or_else(|| DecodeError::MissingAttribute {
                element: "Measure".to_string(),
                attribute: "dataField".to_string(),
            })?;
            let aggregator = el
                .attr("aggregationType")
                .map(Aggregator::parse)
                .unwrap_or_default();
            let display_name = el.attr("displayName").unwrap_or(data_field);
            let position = el
                .attr("position")
                .and_then(|p| p.trim().parse().ok())
                .unwrap_or(index as u32);

            Ok(Measure::new(aggregator, data_field, display_name, position))
        })
        .collect()
}

/// Single or repeated `<Hierarchy>` children become a list; none at all
/// becomes the "all" sentinel.
fn parse_hierarchies(axis_el: &XmlElement) -> Vec<Hierarchy> {
    let hierarchies: Vec<Hierarchy> = axis_el
        .children_named("Hierarchy")
        .map(|el| {
            let name = el.attr("hierarchyName").unwrap_or(Hierarchy::ALL).to_string();
            Hierarchy {
                display_name: el
                    .attr("hierarchyDisplayName")
                    .filter(|s| !s.trim().is_empty())
                    .map(str::to_string),
                dimension: el.attr("dimension").unwrap_or_default().to_string(),
                dimension_type: el.attr("dimensionType").unwrap_or_default().to_string(),
                data_field: el.attr("dataField").unwrap_or(&name).to_string(),
                is_time: el
                    .attr("isTime")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
                name,
            }
        })
        .collect();

    if hierarchies.is_empty() {
        vec![Hierarchy::all()]
    } else {
        hierarchies
    }
}

fn parse_config(config_el: &XmlElement) -> Result<serde_json::Value, DecodeError> {
    let encoded = match config_el.attr("json").map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(serde_json::Value::Object(Default::default())),
    };

    let bytes = LENIENT_BASE64
        .decode(encoded.as_bytes())
        .map_err(|e| DecodeError::InvalidConfig(e.to_string()))?;
    serde_json::from_slice(&bytes).map_err(|e| DecodeError::InvalidConfig(e.to_string()))
}

// ============================================================================
// AXIS CLASSIFICATION
// ============================================================================

/// Picks the expansion strategy. Grid detection runs first so the `autoChart`
/// grid rule is not shadowed by the single-point KPI rule.
fn classify<R: Rng>(
    visualization_type: &str,
    measures: &[Measure],
    col_hierarchies: &[Hierarchy],
    data_row_count: usize,
    options: &DecodeOptions,
    rng: &mut R,
) -> (Axis, bool) {
    let vt = visualization_type;

    if options.grid_rule.is_grid(vt, data_row_count, measures.len()) {
        return (Axis::Category { points: measures.len() }, true);
    }

    if vt.eq_ignore_ascii_case("kpiChart") || vt.eq_ignore_ascii_case("autoChart") {
        return (Axis::Category { points: 1 }, false);
    }

    // Only the leading column hierarchy decides the time axis.
    if col_hierarchies
        .first()
        .map(|h| !h.is_all() && h.is_time_dimension())
        .unwrap_or(false)
    {
        let points = options.initial_points.unwrap_or(DEFAULT_TIME_POINTS);
        return (
            Axis::Time {
                unit: TIME_UNIT_DAY.to_string(),
                points,
            },
            false,
        );
    }

    let single_slice = (vt.eq_ignore_ascii_case("pieChart") || vt.eq_ignore_ascii_case("gaugeChart"))
        && measures.len() > 1;
    let points = if single_slice {
        1
    } else {
        options
            .initial_points
            .unwrap_or_else(|| rng.gen_range(3..=5))
    };

    (Axis::Category { points }, false)
}
