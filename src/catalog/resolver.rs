//! Channel/stream merge
//!
//! Turns the raw `channels.json` and `streams.json` arrays into the canonical
//! [`Channel`] list: one best stream per channel, field defaults applied, and
//! channels without a plausible stream URL dropped.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use tracing::{debug, info};

use crate::models::*;
use crate::utils::url::UrlUtils;

/// Quality labels in order of preference; anything else ranks below these
pub const QUALITY_PREFERENCE: [&str; 3] = ["1080p", "720p", "480p"];

pub struct CatalogResolver {
    // Only used for synthesized ids, which are deliberately not stable.
    rng: Mutex<fastrand::Rng>,
}

impl CatalogResolver {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::new()),
        }
    }

    /// Resolver whose synthesized id suffixes come from a fixed seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(fastrand::Rng::with_seed(seed)),
        }
    }

    /// Merge raw channels and streams into playable channels.
    ///
    /// Never fails: malformed records are defaulted field by field and empty
    /// inputs give an empty result.
    pub fn resolve(&self, raw_channels: &[RawChannel], raw_streams: &[RawStream]) -> Vec<Channel> {
        let streams_by_channel = group_streams(raw_streams);
        debug!(
            "Created stream map with {} channel entries",
            streams_by_channel.len()
        );

        let mut seen_ids = HashSet::new();
        let mut resolved = Vec::with_capacity(raw_channels.len());
        let mut without_url = 0usize;

        for raw in raw_channels {
            let streams = non_blank(raw.id.as_deref())
                .and_then(|id| streams_by_channel.get(id))
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            let channel = self.build_channel(raw, select_best_stream(streams));

            if !UrlUtils::is_plausible_stream_url(&channel.playback_url) {
                without_url += 1;
                continue;
            }
            if !seen_ids.insert(channel.id.clone()) {
                debug!("Dropping duplicate channel id {}", channel.id);
                continue;
            }
            resolved.push(channel);
        }

        info!(
            "Total channels: {}, valid channels with URLs: {} ({} without a usable stream)",
            raw_channels.len(),
            resolved.len(),
            without_url
        );
        resolved
    }

    fn build_channel(&self, raw: &RawChannel, stream: Option<&Stream>) -> Channel {
        let name = non_blank(raw.name.as_deref())
            .unwrap_or(DEFAULT_CHANNEL_NAME)
            .to_string();
        let id = match non_blank(raw.id.as_deref()) {
            Some(id) => id.to_string(),
            None => self.synthesize_id(&name),
        };
        let category = raw
            .categories
            .first()
            .and_then(|c| non_blank(Some(c.as_str())))
            .unwrap_or(DEFAULT_CATEGORY)
            .to_string();

        Channel {
            id,
            logo_url: non_blank(raw.logo.as_deref()).map(str::to_string),
            group: category.clone(),
            category,
            country: non_blank(raw.country.as_deref())
                .unwrap_or(DEFAULT_COUNTRY)
                .to_string(),
            language: raw
                .languages
                .first()
                .and_then(|l| non_blank(Some(l.as_str())))
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
            playback_url: stream.map(|s| s.url.clone()).unwrap_or_default(),
            quality: stream.and_then(|s| s.quality.clone()),
            referrer: stream.and_then(|s| s.referrer.clone()),
            user_agent: stream.and_then(|s| s.user_agent.clone()),
            tvg_id: raw.id.clone(),
            tvg_name: raw.name.clone(),
            name,
        }
    }

    fn synthesize_id(&self, name: &str) -> String {
        let suffix = self
            .rng
            .lock()
            .map(|mut rng| rng.u64(..))
            .unwrap_or_else(|_| fastrand::u64(..));
        format!("{name}-{suffix:016x}")
    }
}

/// Reference lists are passed through with defaults; `code`/`id` stay unique (first wins)
impl CatalogResolver {
    pub fn resolve_countries(raw_countries: &[RawCountry]) -> Vec<Country> {
        let mut seen = HashSet::new();
        raw_countries
            .iter()
            .map(|raw| Country {
                name: raw.name.clone().unwrap_or_default(),
                code: raw.code.clone().unwrap_or_default(),
                flag: raw.flag.clone().unwrap_or_default(),
            })
            .filter(|country| country.code.is_empty() || seen.insert(country.code.clone()))
            .collect()
    }

    pub fn resolve_categories(raw_categories: &[RawCategory]) -> Vec<Category> {
        let mut seen = HashSet::new();
        raw_categories
            .iter()
            .map(|raw| Category {
                id: raw.id.clone().unwrap_or_default(),
                name: raw.name.clone().unwrap_or_default(),
            })
            .filter(|category| category.id.is_empty() || seen.insert(category.id.clone()))
            .collect()
    }
}

impl Default for CatalogResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Group streams by channel id, keeping source order inside each group.
/// Streams without a channel cannot be attached and are skipped.
fn group_streams(raw_streams: &[RawStream]) -> HashMap<String, Vec<Stream>> {
    let mut groups: HashMap<String, Vec<Stream>> = HashMap::new();
    for raw in raw_streams {
        if let Some(channel) = non_blank(raw.channel.as_deref()) {
            groups
                .entry(channel.to_string())
                .or_default()
                .push(Stream::from(raw.clone()));
        }
    }
    groups
}

/// Pick by declared quality first, then by source order
pub fn select_best_stream(streams: &[Stream]) -> Option<&Stream> {
    QUALITY_PREFERENCE
        .iter()
        .find_map(|label| {
            streams
                .iter()
                .find(|s| s.quality.as_deref() == Some(*label))
        })
        .or_else(|| streams.first())
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
