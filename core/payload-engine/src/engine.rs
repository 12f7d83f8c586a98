//! FILENAME: core/payload-engine/src/engine.rs
//! Inflate Pipeline - Turns a captured query schema into a fresh payload.
//!
//! Algorithm:
//! 1. Decode the schema into a QueryDescriptor
//! 2. Validate the skeleton template
//! 3. Build columns, then overlay saved column labels
//! 4. Generate the cell matrix
//! 5. Build rows, then overlay saved row labels
//! 6. Assemble everything into a copy of the template
//!
//! Each call is independent: the template is never mutated, and nothing is
//! cached between calls.

use crate::assemble::{assemble, Payload};
use crate::axis::{build_columns, build_rows, merge_light_columns, merge_light_rows};
use crate::cells::{build_cell_data, data_row_count};
use crate::error::SynthesizerError;
use crate::masking::{NoiseBands, ValueShapeConfig};
use crate::model::LightPayload;
use crate::profile::VisualizationProfile;
use crate::skeleton::SkeletonTemplate;
use chrono::NaiveDate;
use query_schema::{decode_with_rng, DecodeOptions};
use rand::Rng;
use serde_json::Value;

// ============================================================================
// REQUEST
// ============================================================================

/// Everything one inflate needs. Borrowed so a playback can fan out many
/// requests over shared library data.
#[derive(Debug, Clone)]
pub struct InflateRequest<'a> {
    pub template: &'a Value,
    pub schema: &'a str,
    pub visualization_type: &'a str,
    /// Labels saved from an earlier inflate of the same query.
    pub light: Option<&'a LightPayload>,
    pub shape: ValueShapeConfig,
    /// Column count of an earlier inflate. Defaults to the saved labels' count.
    pub prior_column_count: Option<usize>,
    pub profile: VisualizationProfile,
    pub noise: NoiseBands,
    pub initial_points: Option<usize>,
}

impl<'a> InflateRequest<'a> {
    pub fn new(template: &'a Value, schema: &'a str, visualization_type: &'a str) -> Self {
        InflateRequest {
            template,
            schema,
            visualization_type,
            light: None,
            shape: ValueShapeConfig::default(),
            prior_column_count: None,
            profile: VisualizationProfile::default(),
            noise: NoiseBands::default(),
            initial_points: None,
        }
    }

    pub fn with_light(mut self, light: Option<&'a LightPayload>) -> Self {
        self.light = light;
        self
    }

    pub fn with_shape(mut self, shape: ValueShapeConfig) -> Self {
        self.shape = shape;
        self
    }

    pub fn with_prior_column_count(mut self, count: Option<usize>) -> Self {
        self.prior_column_count = count;
        self
    }

    pub fn with_profile(mut self, profile: VisualizationProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_noise(mut self, noise: NoiseBands) -> Self {
        self.noise = noise;
        self
    }

    pub fn with_initial_points(mut self, points: Option<usize>) -> Self {
        self.initial_points = points;
        self
    }

    fn effective_prior_count(&self) -> Option<usize> {
        self.prior_column_count.or_else(|| {
            self.light
                .map(|l| l.columns.len())
                .filter(|count| *count > 0)
        })
    }
}

// ============================================================================
// INFLATER
// ============================================================================

/// Runs the pipeline with an explicit random source and calendar day.
pub struct PayloadInflater<'a, R: Rng> {
    request: &'a InflateRequest<'a>,
    rng: R,
    today: NaiveDate,
}

impl<'a, R: Rng> PayloadInflater<'a, R> {
    pub fn new(request: &'a InflateRequest<'a>, rng: R) -> Self {
        PayloadInflater {
            request,
            rng,
            today: chrono::Local::now().date_naive(),
        }
    }

    /// Pins the last day of generated time axes.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn inflate(mut self) -> Result<Payload, SynthesizerError> {
        let request = self.request;
        let options = DecodeOptions {
            initial_points: request.initial_points,
            grid_rule: request.profile.grid_rule(),
        };
        let descriptor = decode_with_rng(
            request.schema,
            request.visualization_type,
            &options,
            &mut self.rng,
        )?;

        let template = SkeletonTemplate::from_value(request.template.clone())?;

        let mut columns = build_columns(
            &descriptor,
            &template,
            request.effective_prior_count(),
            request.profile,
            self.today,
        );
        if let Some(light) = request.light {
            merge_light_columns(&mut columns, &light.columns);
        }

        let cell_data = build_cell_data(
            &descriptor,
            &columns,
            &request.shape,
            &request.noise,
            request.profile,
            &mut self.rng,
        );

        let mut rows = build_rows(&descriptor, data_row_count(&descriptor));
        if let Some(light) = request.light {
            merge_light_rows(&mut rows, &light.rows);
        }

        assemble(&template, &descriptor, columns, cell_data, rows)
    }
}

/// Inflates with the thread-local RNG and today's date.
pub fn inflate_payload(request: &InflateRequest<'_>) -> Result<Payload, SynthesizerError> {
    PayloadInflater::new(request, rand::thread_rng()).inflate()
}
