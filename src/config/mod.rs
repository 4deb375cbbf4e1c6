use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::info;
use url::Url;

pub mod defaults;
pub mod duration_serde;

use defaults::*;
use duration_serde::duration;

use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub playback: PlaybackConfig,
}

/// Where the four index documents live and how to fetch them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_request_timeout", with = "duration")]
    pub request_timeout: Duration,
    #[serde(default = "default_connect_timeout", with = "duration")]
    pub connect_timeout: Duration,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Freshness window for every cached collection
    #[serde(default = "default_cache_ttl", with = "duration")]
    pub ttl: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_related_limit")]
    pub related_limit: usize,
    #[serde(default)]
    pub curated: CuratedViewConfig,
}

/// Markers for the built-in discovery view shown before any filter is set.
///
/// All markers are matched as lowercase substrings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedViewConfig {
    /// Matched against the channel country
    #[serde(default = "default_country_markers")]
    pub country_markers: Vec<String>,
    /// Locale markers matched against the channel name
    #[serde(default = "default_name_markers")]
    pub name_markers: Vec<String>,
    /// Interest topics matched against category, group and name
    #[serde(default = "default_topic_markers")]
    pub topic_markers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Delay before the one-shot reload after a demuxer incompatibility error
    #[serde(default = "default_reload_delay", with = "duration")]
    pub reload_delay: Duration,
    /// Pointer inactivity before controls hide while playing
    #[serde(default = "default_controls_hide_delay", with = "duration")]
    pub controls_hide_delay: Duration,
    #[serde(default = "default_cross_origin_anonymous")]
    pub cross_origin_anonymous: bool,
    #[serde(default)]
    pub demuxer: DemuxerConfig,
}

/// Options handed to the software demuxer when it is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemuxerConfig {
    #[serde(default = "default_enable_worker")]
    pub enable_worker: bool,
    #[serde(default = "default_low_latency_mode")]
    pub low_latency_mode: bool,
    #[serde(default = "default_back_buffer", with = "duration")]
    pub back_buffer: Duration,
}

fn default_base_url() -> String {
    DEFAULT_INDEX_BASE_URL.to_string()
}

fn default_request_timeout() -> Duration {
    DEFAULT_REQUEST_TIMEOUT
}

fn default_connect_timeout() -> Duration {
    DEFAULT_CONNECT_TIMEOUT
}

fn default_cache_ttl() -> Duration {
    DEFAULT_CACHE_TTL
}

fn default_page_size() -> usize {
    DEFAULT_PAGE_SIZE
}

fn default_related_limit() -> usize {
    DEFAULT_RELATED_LIMIT
}

fn markers(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

fn default_country_markers() -> Vec<String> {
    markers(DEFAULT_COUNTRY_MARKERS)
}

fn default_name_markers() -> Vec<String> {
    markers(DEFAULT_NAME_MARKERS)
}

fn default_topic_markers() -> Vec<String> {
    markers(DEFAULT_TOPIC_MARKERS)
}

fn default_reload_delay() -> Duration {
    DEFAULT_RELOAD_DELAY
}

fn default_controls_hide_delay() -> Duration {
    DEFAULT_CONTROLS_HIDE_DELAY
}

fn default_cross_origin_anonymous() -> bool {
    DEFAULT_CROSS_ORIGIN_ANONYMOUS
}

fn default_enable_worker() -> bool {
    DEFAULT_DEMUXER_ENABLE_WORKER
}

fn default_low_latency_mode() -> bool {
    DEFAULT_DEMUXER_LOW_LATENCY
}

fn default_back_buffer() -> Duration {
    DEFAULT_DEMUXER_BACK_BUFFER
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            related_limit: DEFAULT_RELATED_LIMIT,
            curated: CuratedViewConfig::default(),
        }
    }
}

impl Default for CuratedViewConfig {
    fn default() -> Self {
        Self {
            country_markers: default_country_markers(),
            name_markers: default_name_markers(),
            topic_markers: default_topic_markers(),
        }
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            reload_delay: DEFAULT_RELOAD_DELAY,
            controls_hide_delay: DEFAULT_CONTROLS_HIDE_DELAY,
            cross_origin_anonymous: DEFAULT_CROSS_ORIGIN_ANONYMOUS,
            demuxer: DemuxerConfig::default(),
        }
    }
}

impl Default for DemuxerConfig {
    fn default() -> Self {
        Self {
            enable_worker: DEFAULT_DEMUXER_ENABLE_WORKER,
            low_latency_mode: DEFAULT_DEMUXER_LOW_LATENCY,
            back_buffer: DEFAULT_DEMUXER_BACK_BUFFER,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            info!("Config file {} not found, using defaults", config_file);
            Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.catalog.page_size == 0 {
            return Err(AppError::configuration("catalog.page_size must be at least 1"));
        }
        Url::parse(&self.index.base_url).map_err(|e| {
            AppError::configuration(format!("index.base_url '{}': {e}", self.index.base_url))
        })?;
        Ok(())
    }
}
