//! FILENAME: core/payload-engine/src/masking.rs
//! PURPOSE: Generates fake numeric series with a chosen statistical shape.
//! CONTEXT: Each data row of a synthesized payload is one call to `generate`.
//! The caller declares a range and a preset; the generator always returns
//! exactly `count` values. Noise may push a value slightly past the declared
//! bounds; that is accepted and not corrected.
//!
//! PRESETS:
//! - random:      uniform in range (default, and fallback for unknown names)
//! - flat:        midpoint +/- flat noise
//! - increase:    linear ramp min -> max, noise proportional to the step
//! - decrease:    linear ramp max -> min
//! - peak_mid:    high at the center, low at the edges
//! - valley_mid:  low at the center, high at the edges
//! - spike:       low values with exactly one index near the maximum

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MIN: f64 = 0.0;
pub const DEFAULT_MAX: f64 = 1000.0;

// ============================================================================
// CONFIGURATION
// ============================================================================

/// A range bound as stored by the popup: either a number or the raw text of
/// an input field (possibly empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RangeBound {
    Number(f64),
    Text(String),
}

impl RangeBound {
    fn resolve(&self, default: f64) -> f64 {
        match self {
            RangeBound::Number(n) if n.is_finite() => *n,
            RangeBound::Number(_) => default,
            RangeBound::Text(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()).unwrap_or(default),
        }
    }
}

impl From<f64> for RangeBound {
    fn from(n: f64) -> Self {
        RangeBound::Number(n)
    }
}

/// Named shape of a generated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MaskingPreset {
    #[default]
    Random,
    Flat,
    Increase,
    Decrease,
    PeakMid,
    ValleyMid,
    Spike,
}

impl MaskingPreset {
    /// Parses a preset name. Unknown names fall back to `Random`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "flat" => MaskingPreset::Flat,
            "increase" => MaskingPreset::Increase,
            "decrease" => MaskingPreset::Decrease,
            "peak_mid" => MaskingPreset::PeakMid,
            "valley_mid" => MaskingPreset::ValleyMid,
            "spike" => MaskingPreset::Spike,
            _ => MaskingPreset::Random,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MaskingPreset::Random => "random",
            MaskingPreset::Flat => "flat",
            MaskingPreset::Increase => "increase",
            MaskingPreset::Decrease => "decrease",
            MaskingPreset::PeakMid => "peak_mid",
            MaskingPreset::ValleyMid => "valley_mid",
            MaskingPreset::Spike => "spike",
        }
    }
}

impl From<String> for MaskingPreset {
    fn from(raw: String) -> Self {
        MaskingPreset::parse(&raw)
    }
}

impl From<MaskingPreset> for String {
    fn from(preset: MaskingPreset) -> Self {
        preset.as_str().to_string()
    }
}

/// Range and preset for one query, as configured in the popup.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValueShapeConfig {
    /// `[min, max]`; missing, empty or unparsable entries use the defaults.
    #[serde(default)]
    pub range: Vec<Option<RangeBound>>,

    #[serde(default)]
    pub preset: MaskingPreset,
}

impl ValueShapeConfig {
    pub fn new(min: f64, max: f64, preset: MaskingPreset) -> Self {
        ValueShapeConfig {
            range: vec![Some(min.into()), Some(max.into())],
            preset,
        }
    }

    /// Resolved `(min, max)`, with reversed bounds swapped.
    pub fn bounds(&self) -> (f64, f64) {
        let bound = |index: usize, default: f64| {
            self.range
                .get(index)
                .and_then(|b| b.as_ref())
                .map(|b| b.resolve(default))
                .unwrap_or(default)
        };
        let min = bound(0, DEFAULT_MIN);
        let max = bound(1, DEFAULT_MAX);
        // A span too wide for f64 cannot be sampled.
        if !(max - min).is_finite() {
            return (DEFAULT_MIN, DEFAULT_MAX);
        }
        if min > max {
            (max, min)
        } else {
            (min, max)
        }
    }
}

/// Noise amplitudes of the shaped presets.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NoiseBands {
    /// Absolute +/- noise around the midpoint for `flat`.
    pub flat_noise: f64,
    /// Noise for `increase`/`decrease`, as a fraction of the step size.
    pub ramp_noise_ratio: f64,
    /// Absolute +/- noise for `peak_mid`/`valley_mid`.
    pub peak_valley_noise: f64,
    /// Ceiling of the low values of `spike`, as a fraction of max.
    pub spike_floor_ratio: f64,
    /// Lower bound of the spike value, as a fraction of max.
    pub spike_peak_ratio: f64,
}

impl Default for NoiseBands {
    fn default() -> Self {
        NoiseBands {
            flat_noise: 15.0,
            ramp_noise_ratio: 0.25,
            peak_valley_noise: 10.0,
            spike_floor_ratio: 0.1,
            spike_peak_ratio: 0.8,
        }
    }
}

// ============================================================================
// GENERATION
// ============================================================================

/// Returns exactly `count` values shaped by `config.preset`.
/// Values are rounded to 2 decimals for fractional ranges (`max <= 1`) and to
/// whole numbers otherwise.
pub fn generate<R: Rng>(
    config: &ValueShapeConfig,
    count: usize,
    noise: &NoiseBands,
    rng: &mut R,
) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }

    let (min, max) = config.bounds();
    let fractional = max <= 1.0;

    let raw: Vec<f64> = match config.preset {
        MaskingPreset::Random => (0..count).map(|_| uniform(rng, min, max)).collect(),
        MaskingPreset::Flat => {
            let mid = (min + max) / 2.0;
            (0..count)
                .map(|_| mid + jitter(rng, noise.flat_noise))
                .collect()
        }
        MaskingPreset::Increase | MaskingPreset::Decrease => {
            let step = if count > 1 {
                (max - min) / (count - 1) as f64
            } else {
                0.0
            };
            let band = step * noise.ramp_noise_ratio;
            (0..count)
                .map(|i| {
                    let base = if config.preset == MaskingPreset::Increase {
                        min + step * i as f64
                    } else {
                        max - step * i as f64
                    };
                    base + jitter(rng, band)
                })
                .collect()
        }
        MaskingPreset::PeakMid | MaskingPreset::ValleyMid => {
            let (center, edge) = if config.preset == MaskingPreset::PeakMid {
                (max, min)
            } else {
                (min, max)
            };
            let mid = (count - 1) as f64 / 2.0;
            (0..count)
                .map(|i| {
                    let distance = if mid > 0.0 {
                        (i as f64 - mid).abs() / mid
                    } else {
                        0.0
                    };
                    lerp(center, edge, distance) + jitter(rng, noise.peak_valley_noise)
                })
                .collect()
        }
        MaskingPreset::Spike => {
            let floor = max * noise.spike_floor_ratio;
            let spike_at = rng.gen_range(0..count);
            (0..count)
                .map(|i| {
                    if i == spike_at {
                        uniform(rng, max * noise.spike_peak_ratio, max)
                    } else {
                        uniform(rng, min.min(floor), floor)
                    }
                })
                .collect()
        }
    };

    raw.into_iter()
        .map(|v| if fractional { round_to(v, 2) } else { v.round() })
        .collect()
}

/// Uniform sample in `[lo, hi]`; degenerate or unsampleable ranges return `lo`.
fn uniform<R: Rng>(rng: &mut R, lo: f64, hi: f64) -> f64 {
    if hi > lo && (hi - lo).is_finite() {
        rng.gen_range(lo..=hi)
    } else {
        lo
    }
}

fn jitter<R: Rng>(rng: &mut R, band: f64) -> f64 {
    uniform(rng, -band.abs(), band.abs())
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
