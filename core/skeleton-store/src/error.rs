//! FILENAME: core/skeleton-store/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Skeleton not found: {0}")]
    SkeletonNotFound(String),

    #[error("Query {query_id} not found in skeleton {skeleton_id}")]
    QueryNotFound { skeleton_id: String, query_id: String },

    #[error("Scenario not found: {0}")]
    ScenarioNotFound(String),

    #[error("A scenario named '{0}' already exists")]
    DuplicateName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Invalid file format: {0}")]
    InvalidFormat(String),
}
