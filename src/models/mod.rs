use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub mod raw;

pub use raw::{RawCategory, RawChannel, RawCountry, RawStream};

/// Defaults applied while resolving raw records
pub const DEFAULT_CHANNEL_NAME: &str = "Unknown Channel";
pub const DEFAULT_STREAM_TITLE: &str = "Unknown Stream";
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_COUNTRY: &str = "Unknown";
pub const DEFAULT_LANGUAGE: &str = "Unknown";

/// A resolved, playable channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    /// Upstream id, or `name-<random>` when upstream omitted it (not stable across refreshes)
    pub id: String,
    pub name: String,
    pub logo_url: Option<String>,
    pub group: String,
    pub category: String,
    pub country: String,
    pub language: String,
    pub playback_url: String,
    /// Quality label of the stream the URL was taken from
    pub quality: Option<String>,
    /// HTTP referrer the upstream stream requires, if any
    pub referrer: Option<String>,
    /// HTTP user agent the upstream stream requires, if any
    pub user_agent: Option<String>,
    pub tvg_id: Option<String>,
    pub tvg_name: Option<String>,
}

/// A stream record after field defaulting, still keyed by its channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stream {
    pub channel: Option<String>,
    pub feed: Option<String>,
    pub title: String,
    pub url: String,
    pub referrer: Option<String>,
    pub user_agent: Option<String>,
    pub quality: Option<String>,
}

impl From<RawStream> for Stream {
    fn from(raw: RawStream) -> Self {
        Self {
            channel: raw.channel,
            feed: raw.feed,
            title: raw
                .title
                .unwrap_or_else(|| DEFAULT_STREAM_TITLE.to_string()),
            url: raw.url.unwrap_or_default(),
            referrer: raw.referrer,
            user_agent: raw.user_agent,
            quality: raw.quality,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
    /// Display glyph, usually a flag emoji
    pub flag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// The resolved channel collection and when it was fetched.
///
/// Published whole and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub channels: Arc<Vec<Channel>>,
    pub fetched_at: DateTime<Utc>,
}

impl CatalogSnapshot {
    pub fn new(channels: Vec<Channel>, fetched_at: DateTime<Utc>) -> Self {
        Self {
            channels: Arc::new(channels),
            fetched_at,
        }
    }
}

/// Free-form catalog filters; blank values are treated as absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelFilters {
    pub search_query: Option<String>,
    pub country: Option<String>,
    pub category: Option<String>,
    pub language: Option<String>,
}

impl ChannelFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search<S: Into<String>>(mut self, term: S) -> Self {
        self.search_query = Some(term.into());
        self
    }

    pub fn country<S: Into<String>>(mut self, country: S) -> Self {
        self.country = Some(country.into());
        self
    }

    pub fn category<S: Into<String>>(mut self, category: S) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn language<S: Into<String>>(mut self, language: S) -> Self {
        self.language = Some(language.into());
        self
    }

    /// True when no filter carries a non-blank value
    pub fn is_empty(&self) -> bool {
        [
            &self.search_query,
            &self.country,
            &self.category,
            &self.language,
        ]
        .iter()
        .all(|value| value.as_deref().map_or(true, |v| v.trim().is_empty()))
    }
}

/// One window of a query result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelPage {
    pub items: Vec<Channel>,
    /// 1-indexed page that was requested
    pub page: usize,
    pub total_pages: usize,
    pub total_count: usize,
}
