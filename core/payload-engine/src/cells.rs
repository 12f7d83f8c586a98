//! FILENAME: core/payload-engine/src/cells.rs
//! PURPOSE: Builds the cellData matrix for a set of generated columns.
//! CONTEXT: Each row is one independent masked series. Raw values are then
//! shaped per measure: percentages are squeezed into a believable band and
//! counts come out as whole numbers.

use crate::masking::{generate, round_to, NoiseBands, ValueShapeConfig};
use crate::model::{Cell, Column};
use crate::profile::VisualizationProfile;
use query_schema::{is_percentage, Aggregator, Measure, QueryDescriptor};
use rand::Rng;
use serde_json::Value;

/// Data rows emitted for grids and multi-row tables.
pub const GRID_ROW_COUNT: usize = 4;

/// Number of data rows for a descriptor.
pub fn data_row_count(descriptor: &QueryDescriptor) -> usize {
    if descriptor.is_grid || descriptor.has_multi_row_hierarchy() {
        GRID_ROW_COUNT
    } else {
        1
    }
}

/// Builds `data_row_count` rows of cells.
///
/// Grids get one cell per measure; everything else gets one cell per column,
/// with the measure of column `c` being `measures[c % measures.len()]`.
pub fn build_cell_data<R: Rng>(
    descriptor: &QueryDescriptor,
    columns: &[Column],
    shape: &ValueShapeConfig,
    noise: &NoiseBands,
    profile: VisualizationProfile,
    rng: &mut R,
) -> Vec<Vec<Cell>> {
    let measures = &descriptor.measures;
    if measures.is_empty() {
        return vec![Vec::new(); data_row_count(descriptor)];
    }

    let width = if descriptor.is_grid {
        measures.len()
    } else {
        columns.len()
    };
    let (_, range_max) = shape.bounds();

    (0..data_row_count(descriptor))
        .map(|_| {
            generate(shape, width, noise, rng)
                .into_iter()
                .enumerate()
                .map(|(col, raw)| {
                    let measure = &measures[col % measures.len()];
                    Cell {
                        value: fake_value(raw, measure, &descriptor.config_json, range_max, profile),
                    }
                })
                .collect()
        })
        .collect()
}

/// Maps a raw generated value onto what the measure would plausibly show.
pub fn fake_value(
    raw: f64,
    measure: &Measure,
    config_json: &Value,
    range_max: f64,
    profile: VisualizationProfile,
) -> f64 {
    if is_percentage(measure, config_json) {
        let ratio = if range_max > 1.0 { raw / range_max } else { raw };
        let (lo, hi) = profile.percent_clamp();
        return round_to(ratio.clamp(lo, hi), 2);
    }

    match measure.aggregator {
        Aggregator::Sum | Aggregator::Count | Aggregator::DistinctCount => raw,
        Aggregator::Average | Aggregator::Median => round_to(raw, 1),
        Aggregator::Other(_) => raw,
    }
}
