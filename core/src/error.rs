//! Error types for the client.
//!
//! # Design
//! Transport failures are deliberately flattened: listeners only ever see
//! `TransportError::message`, a single string. The variants exist for the
//! local log line and for the transport's own tests. `ClientError` covers the
//! few failures reported synchronously by a verb call, in which case no
//! listener callback happens.

use thiserror::Error;

/// Failure of one HTTP round-trip.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// DNS, connect or I/O failure.
    #[error("connection error: {0}")]
    Connection(String),

    #[error("request timed out")]
    Timeout,

    #[error("{0}")]
    Other(String),

    /// A failure that carries no description at all.
    #[error("unknown transport error")]
    Unknown,
}

impl TransportError {
    /// The message handed to `Listener::on_error`.
    pub fn message(&self) -> Option<String> {
        match self {
            TransportError::Unknown => None,
            other => Some(other.to_string()),
        }
    }
}

/// Failure to hand a request to the queue.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request queue has been stopped")]
    Stopped,

    #[error("failed to start request queue: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Invalid configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a positive number, got {value:?}")]
    InvalidNumber { var: &'static str, value: String },
}
