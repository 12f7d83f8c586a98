//! FILENAME: core/payload-engine/src/error.rs

use query_schema::DecodeError;
use thiserror::Error;

/// Failures of the inflate pipeline. Decode failures mean the captured schema
/// is bad; shape mismatches mean the skeleton template is bad.
#[derive(Error, Debug)]
pub enum SynthesizerError {
    #[error("Invalid schema: {0}")]
    Decode(#[from] DecodeError),

    #[error("Skeleton shape mismatch: {0}")]
    ShapeMismatch(String),

    #[error("Payload encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
