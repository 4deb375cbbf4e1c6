//! Centralized error handling for the IPTV catalog client
//!
//! Errors are grouped by the layer that produces them:
//!
//! - **Source Errors**: remote index connectivity and document decoding
//! - **Playback Errors**: misuse of a playback session's control surface
//! - **Application Errors**: everything the host-facing API can report
//!
//! Transport failures are normally swallowed by [`crate::catalog::CatalogCache`]
//! and only ever logged; the types here are what the lower layers use to talk
//! to it.
//!
//! # Usage
//!
//! ```rust
//! use iptv_catalog::errors::{AppError, AppResult};
//!
//! fn lookup(id: &str) -> AppResult<String> {
//!     Err(AppError::not_found("channel", id))
//! }
//! ```

pub mod types;

pub use types::*;

/// Convenience type alias for Results using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Convenience type alias for Source Results
pub type SourceResult<T> = Result<T, SourceError>;

/// Convenience type alias for Playback Results
pub type PlaybackResult<T> = Result<T, PlaybackError>;
