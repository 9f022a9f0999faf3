//! Stream Engine Errors
//!
//! Error types for the research stream client and reconstruction engine.
//! `StreamError` is serde-tagged so a host application can forward it to a
//! frontend as structured JSON rather than a flattened string.

use serde::{Deserialize, Serialize};

/// Error types for stream consumption
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamError {
    /// Backend rejected the request (bad parameters, unknown knowledge base)
    InvalidRequest { message: String },
    /// Backend returned a non-success HTTP status
    ServerError {
        message: String,
        status: Option<u16>,
    },
    /// Network/connection error before or during the stream
    NetworkError { message: String },
    /// No bytes arrived within the configured stall timeout
    Stalled { after_secs: u64 },
    /// Backend reported a fatal error event mid-stream
    Backend { message: String },
    /// Other error
    Other { message: String },
}

impl std::fmt::Display for StreamError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamError::InvalidRequest { message } => {
                write!(f, "Invalid request: {}", message)
            }
            StreamError::ServerError { message, status } => {
                if let Some(s) = status {
                    write!(f, "Server error ({}): {}", s, message)
                } else {
                    write!(f, "Server error: {}", message)
                }
            }
            StreamError::NetworkError { message } => {
                write!(f, "Network error: {}", message)
            }
            StreamError::Stalled { after_secs } => {
                write!(f, "Stream stalled: no data for {}s", after_secs)
            }
            StreamError::Backend { message } => {
                write!(f, "Backend error: {}", message)
            }
            StreamError::Other { message } => {
                write!(f, "Error: {}", message)
            }
        }
    }
}

impl std::error::Error for StreamError {}

impl From<reqwest::Error> for StreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StreamError::NetworkError {
                message: format!("Request timed out: {}", err),
            }
        } else if err.is_connect() {
            StreamError::NetworkError {
                message: format!("Connection failed: {}", err),
            }
        } else if let Some(status) = err.status() {
            StreamError::ServerError {
                message: err.to_string(),
                status: Some(status.as_u16()),
            }
        } else {
            StreamError::NetworkError {
                message: err.to_string(),
            }
        }
    }
}

/// Result type for stream operations
pub type StreamResult<T> = Result<T, StreamError>;

/// Why a single frame was dropped by the router. Reported through the
/// engine's frame-error hook; never fatal to the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// Payload was not valid JSON
    Malformed { raw: String },
    /// Valid JSON but no event set recognized the discriminator
    Unrecognized { kind: String },
}

impl std::fmt::Display for FrameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FrameError::Malformed { raw } => {
                let preview: String = raw.chars().take(80).collect();
                write!(f, "Malformed frame: {}", preview)
            }
            FrameError::Unrecognized { kind } => {
                write!(f, "Unrecognized event type: {}", kind)
            }
        }
    }
}
