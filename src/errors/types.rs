//! Error type definitions for the IPTV catalog client

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Remote index errors
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Playback session errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },
}

/// Remote index specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// The request never produced a response (DNS, connect, timeout, TLS)
    #[error("Request failed: {url} - {message}")]
    Request { url: String, message: String },

    /// Non-success HTTP status from the index
    #[error("HTTP error: {status} - {url}")]
    Http { status: u16, url: String },

    /// The body was not a JSON array of records
    #[error("Decode error: {document} - {message}")]
    Decode { document: String, message: String },

    /// The configured base URL cannot be joined with a document name
    #[error("Invalid index URL: {url} - {message}")]
    InvalidUrl { url: String, message: String },
}

/// Playback control errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The session was disposed and can no longer be driven
    #[error("Playback session already disposed")]
    Disposed,

    /// The requested control is not meaningful in the current state
    #[error("Invalid state for {action}: {state}")]
    InvalidState { action: String, state: String },

    /// Volume outside the closed unit interval
    #[error("Volume out of range: {0} (expected 0.0..=1.0)")]
    InvalidVolume(f64),

    /// Seek target that is negative or not a number
    #[error("Invalid seek position: {0}")]
    InvalidPosition(f64),

    /// The render surface refused an operation
    #[error("Render surface error: {0}")]
    Surface(String),
}

/// What the presentation layer should offer next to a terminal error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Go back to the channel listing
    ReturnToCatalog,
    /// Reload the current stream
    RetryPlayback,
}

/// A displayable terminal error with its single recovery action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    pub message: String,
    pub recovery: RecoveryAction,
}

impl UserFacingError {
    pub fn return_to_catalog<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            recovery: RecoveryAction::ReturnToCatalog,
        }
    }

    pub fn retry_playback<S: Into<String>>(message: S) -> Self {
        Self {
            message: message.into(),
            recovery: RecoveryAction::RetryPlayback,
        }
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a not found error for a specific resource
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Map the error onto the message and action shown to the viewer
    pub fn to_user_facing(&self) -> UserFacingError {
        match self {
            Self::NotFound { resource, .. } if resource == "channel" => {
                UserFacingError::return_to_catalog("Channel not found")
            }
            Self::NotFound { .. } => UserFacingError::return_to_catalog("Not found"),
            Self::Playback(_) => UserFacingError::retry_playback("Stream unavailable"),
            _ => UserFacingError::return_to_catalog("Failed to load channel"),
        }
    }
}

impl SourceError {
    /// Create a request error
    pub fn request<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::Request {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http<U: Into<String>>(status: u16, url: U) -> Self {
        Self::Http {
            status,
            url: url.into(),
        }
    }

    /// Create a decode error
    pub fn decode<D: Into<String>, M: Into<String>>(document: D, message: M) -> Self {
        Self::Decode {
            document: document.into(),
            message: message.into(),
        }
    }

    /// Create an invalid URL error
    pub fn invalid_url<U: Into<String>, M: Into<String>>(url: U, message: M) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }
}

impl PlaybackError {
    /// Create an invalid state error
    pub fn invalid_state<A: Into<String>, S: Into<String>>(action: A, state: S) -> Self {
        Self::InvalidState {
            action: action.into(),
            state: state.into(),
        }
    }
}
