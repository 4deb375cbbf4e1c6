//! Catalog and playback client for public IPTV channel indexes
//!
//! The [`catalog`] side fetches the index documents, merges channels with
//! their best stream and serves cached, filterable pages. The [`playback`]
//! side picks a delivery strategy for a stream URL and runs a session state
//! machine with bounded failure recovery against a host-provided surface.

pub mod catalog;
pub mod config;
pub mod errors;
pub mod models;
pub mod playback;
pub mod sources;
pub mod utils;
