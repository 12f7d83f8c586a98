//! FILENAME: app/demolens/src/error.rs

use payload_engine::SynthesizerError;
use skeleton_store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Synthesizer(#[from] SynthesizerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("No dashboard became current after {attempts} attempts")]
    Timeout { attempts: u32 },

    #[error("Playback of {skeleton_id}/{query_id} panicked")]
    WorkerPanicked { skeleton_id: String, query_id: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

impl AppError {
    /// Stable error category reported to the extension.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Synthesizer(SynthesizerError::Decode(_)) => "decode",
            AppError::Synthesizer(_) => "shape",
            AppError::Store(
                StoreError::SkeletonNotFound(_)
                | StoreError::QueryNotFound { .. }
                | StoreError::ScenarioNotFound(_),
            ) => "not_found",
            AppError::Store(StoreError::DuplicateName(_)) => "invalid_request",
            AppError::Store(_) | AppError::Io(_) => "storage",
            AppError::InvalidRequest(_) | AppError::InvalidConfig(_) | AppError::Json(_) => {
                "invalid_request"
            }
            AppError::Timeout { .. } => "timeout",
            AppError::WorkerPanicked { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_schema::DecodeError;

    #[test]
    fn test_kinds() {
        let decode = AppError::from(SynthesizerError::Decode(DecodeError::InvalidGzip("bad header".to_string())));
        assert_eq!(decode.kind(), "decode");

        let shape = AppError::from(SynthesizerError::ShapeMismatch("x".to_string()));
        assert_eq!(shape.kind(), "shape");

        let missing = AppError::from(StoreError::ScenarioNotFound("s".to_string()));
        assert_eq!(missing.kind(), "not_found");

        let dup = AppError::from(StoreError::DuplicateName("s".to_string()));
        assert_eq!(dup.kind(), "invalid_request");

        assert_eq!(AppError::Timeout { attempts: 3 }.kind(), "timeout");

        let panicked = AppError::WorkerPanicked {
            skeleton_id: "s".to_string(),
            query_id: "q".to_string(),
        };
        assert_eq!(panicked.kind(), "internal");
        assert_eq!(panicked.to_string(), "Playback of s/q panicked");
        assert_eq!(
            AppError::from(StoreError::InvalidFormat("x".to_string())).kind(),
            "storage"
        );
    }
}
