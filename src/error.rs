//! Error types for the smartpdf library.

use std::io;
use thiserror::Error;

/// Result type alias for smartpdf operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Fallback message shown when a failure carries no usable reason.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Failed to analyze PDF. Please check your API key or file size.";

/// Message shown when the uploaded bytes could not be read.
pub const READ_FAILURE_MESSAGE: &str = "Error reading file.";

/// Error types that can occur in the analysis, editing and export pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading uploads or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The upload was rejected before any processing started.
    #[error("{0}")]
    Validation(String),

    /// No credential is configured for the AI service.
    #[error("API Key is missing")]
    MissingCredential,

    /// The AI service call failed (network, quota, HTTP status).
    #[error("AI service error: {0}")]
    Service(String),

    /// The AI service answered, but not with the expected shape.
    #[error("Malformed service response: {0}")]
    MalformedResponse(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Structured rendering failed.
    #[error("Rendering error: {0}")]
    Render(String),

    /// An embedded image could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// Another call of the same kind is still in flight.
    #[error("Another {0} is already in progress")]
    Busy(&'static str),

    /// The operation is not valid in the current session state.
    #[error("Operation requires {expected} state, but session is {actual}")]
    InvalidState {
        /// State the operation needs
        expected: &'static str,
        /// State the session was in
        actual: &'static str,
    },

    /// No exporter is registered under the given name or extension.
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

/// Coarse classification used for error propagation policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Rejected input, recovered locally with an inline message.
    Validation,
    /// Local read/write failure.
    Io,
    /// Remote AI service failure of any sort.
    Service,
    /// Export rendering failure.
    Render,
    /// Busy or out-of-order session operation.
    State,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::Io(_) => ErrorKind::Io,
            Error::MissingCredential
            | Error::Service(_)
            | Error::MalformedResponse(_)
            | Error::Json(_) => ErrorKind::Service,
            Error::Render(_) | Error::Image(_) => ErrorKind::Render,
            Error::Busy(_) | Error::InvalidState { .. } | Error::UnsupportedFormat(_) => {
                ErrorKind::State
            }
            Error::Other(_) => ErrorKind::Service,
        }
    }

    /// Message surfaced to the user in the session's error state.
    ///
    /// Falls back to a generic message when the failure has no text.
    pub fn user_message(&self) -> String {
        let message = match self {
            Error::Io(_) => READ_FAILURE_MESSAGE.to_string(),
            Error::Service(msg) | Error::Other(msg) => msg.trim().to_string(),
            other => other.to_string(),
        };
        if message.is_empty() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            message
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            _ => Error::Render(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        Error::Image(err.to_string())
    }
}

#[cfg(feature = "gemini")]
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Service("The AI service did not respond in time".to_string())
        } else if err.is_decode() {
            Error::MalformedResponse(err.to_string())
        } else {
            Error::Service(err.to_string())
        }
    }
}
