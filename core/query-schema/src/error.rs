//! FILENAME: core/query-schema/src/error.rs

use thiserror::Error;

/// Everything that can go wrong while turning a schema blob into a descriptor.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    #[error("Invalid base64 schema: {0}")]
    InvalidBase64(String),

    #[error("Invalid gzip stream: {0}")]
    InvalidGzip(String),

    #[error("Schema is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    #[error("Malformed XML: {0}")]
    MalformedXml(String),

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Missing attribute '{attribute}' on <{element}>")]
    MissingAttribute {
        element: String,
        attribute: String,
    },

    #[error("Invalid Config JSON: {0}")]
    InvalidConfig(String),
}
