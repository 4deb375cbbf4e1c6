/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
use std::time::Duration;

// Remote index defaults
pub const DEFAULT_INDEX_BASE_URL: &str = "https://iptv-org.github.io/api";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

// Cache defaults
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

// Catalog defaults
pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const DEFAULT_RELATED_LIMIT: usize = 8;
pub const DEFAULT_COUNTRY_MARKERS: &[&str] = &["bangladesh", "bd"];
pub const DEFAULT_NAME_MARKERS: &[&str] = &["bangladesh", "bangla"];
pub const DEFAULT_TOPIC_MARKERS: &[&str] = &["sport"];

// Playback defaults
pub const DEFAULT_RELOAD_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);
pub const DEFAULT_CROSS_ORIGIN_ANONYMOUS: bool = true;
pub const DEFAULT_DEMUXER_ENABLE_WORKER: bool = false;
pub const DEFAULT_DEMUXER_LOW_LATENCY: bool = true;
pub const DEFAULT_DEMUXER_BACK_BUFFER: Duration = Duration::from_secs(90);

pub fn default_user_agent() -> String {
    format!("iptv-catalog/{}", env!("CARGO_PKG_VERSION"))
}
