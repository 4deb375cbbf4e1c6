//! Delivery strategy selection
//!
//! Decided once per source URL from the URL shape and what the runtime can
//! do. Only the software demuxer strategy has internal error classification;
//! the other two hand the URL straight to the render surface.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::utils::url::UrlUtils;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStrategy {
    /// Manifest parsed and segments fed to the surface by a software demuxer
    SoftwareDemux,
    /// Manifest URL handed to a surface that demuxes HLS itself
    Native,
    /// Progressive/direct playback of whatever the URL serves
    Direct,
}

impl fmt::Display for DeliveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SoftwareDemux => "software-demux",
            Self::Native => "native",
            Self::Direct => "direct",
        };
        f.write_str(name)
    }
}

/// What the runtime and the render surface support
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackCapabilities {
    pub software_demux: bool,
    pub native_hls: bool,
}

/// Pick the delivery strategy for `url`.
///
/// HLS manifests prefer the software demuxer, then native support, and fall
/// back to direct playback. Everything else is played directly.
pub fn select_strategy(url: &str, capabilities: PlaybackCapabilities) -> DeliveryStrategy {
    if !UrlUtils::is_adaptive_manifest(url) {
        return DeliveryStrategy::Direct;
    }
    if capabilities.software_demux {
        DeliveryStrategy::SoftwareDemux
    } else if capabilities.native_hls {
        DeliveryStrategy::Native
    } else {
        DeliveryStrategy::Direct
    }
}
