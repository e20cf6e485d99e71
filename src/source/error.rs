//! Snapshot source error types
//!
//! Every variant is a transport error: it is logged and answered with a
//! reconnect, never surfaced to the dashboard.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while talking to the event stream
#[derive(Error, Debug)]
pub enum SourceError {
    /// The connection could not be established
    #[error("Connection failed: {0}")]
    Connect(#[source] reqwest::Error),

    /// The server answered the handshake with a non-success status
    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    /// The handshake did not complete in time
    #[error("Handshake timed out after {0:?}")]
    Timeout(Duration),

    /// The established stream failed mid-flight
    #[error("Stream error: {0}")]
    Stream(#[source] reqwest::Error),

    /// The HTTP client could not be built
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Result type alias for source operations
pub type SourceResult<T> = Result<T, SourceError>;
