//! Payload decoding errors

use thiserror::Error;

/// Reasons an inbound message could not be turned into a snapshot
#[derive(Error, Debug)]
pub enum PayloadError {
    /// The message body is not valid JSON
    #[error("Invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// The top-level JSON value is not an object
    #[error("Expected a JSON object, found {0}")]
    NotAnObject(&'static str),

    /// A collection is present but its elements have the wrong shape
    #[error("Invalid snapshot shape: {0}")]
    InvalidShape(#[source] serde_json::Error),
}
