//! In-memory index used by the catalog unit tests

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::errors::{SourceError, SourceResult};
use crate::models::{RawCategory, RawChannel, RawCountry, RawStream};
use crate::sources::IndexSource;

pub(crate) struct FakeIndex {
    channels: Mutex<Vec<RawChannel>>,
    streams: Mutex<Vec<RawStream>>,
    failing: AtomicBool,
    failing_reference: AtomicBool,
    channel_fetches: AtomicUsize,
    country_fetches: AtomicUsize,
}

impl Default for FakeIndex {
    fn default() -> Self {
        Self {
            channels: Mutex::new(Vec::new()),
            streams: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            failing_reference: AtomicBool::new(false),
            channel_fetches: AtomicUsize::new(0),
            country_fetches: AtomicUsize::new(0),
        }
    }
}

impl FakeIndex {
    /// One channel and one stream per `(id, name, url)`
    pub(crate) fn with_channels(entries: &[(&str, &str, &str)]) -> Self {
        let index = Self::default();
        index.set_channels(entries);
        index
    }

    pub(crate) fn set_channels(&self, entries: &[(&str, &str, &str)]) {
        let channels = entries
            .iter()
            .map(|(id, name, _)| RawChannel {
                id: Some(id.to_string()),
                name: Some(name.to_string()),
                categories: vec!["general".to_string()],
                country: Some("US".to_string()),
                ..Default::default()
            })
            .collect();
        let streams = entries
            .iter()
            .map(|(id, _, url)| RawStream {
                channel: Some(id.to_string()),
                url: Some(url.to_string()),
                ..Default::default()
            })
            .collect();
        *self.channels.lock().unwrap() = channels;
        *self.streams.lock().unwrap() = streams;
    }

    pub(crate) fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn fail_reference_lists(&self, failing: bool) {
        self.failing_reference.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn channel_fetches(&self) -> usize {
        self.channel_fetches.load(Ordering::SeqCst)
    }

    pub(crate) fn country_fetches(&self) -> usize {
        self.country_fetches.load(Ordering::SeqCst)
    }

    fn check(&self, document: &str, reference: bool) -> SourceResult<()> {
        let failing = self.failing.load(Ordering::SeqCst)
            || (reference && self.failing_reference.load(Ordering::SeqCst));
        if failing {
            Err(SourceError::http(503, format!("fake://{document}")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl IndexSource for FakeIndex {
    async fn fetch_channels(&self) -> SourceResult<Vec<RawChannel>> {
        self.channel_fetches.fetch_add(1, Ordering::SeqCst);
        self.check("channels.json", false)?;
        Ok(self.channels.lock().unwrap().clone())
    }

    async fn fetch_streams(&self) -> SourceResult<Vec<RawStream>> {
        self.check("streams.json", false)?;
        Ok(self.streams.lock().unwrap().clone())
    }

    async fn fetch_countries(&self) -> SourceResult<Vec<RawCountry>> {
        self.country_fetches.fetch_add(1, Ordering::SeqCst);
        self.check("countries.json", true)?;
        Ok(vec![
            RawCountry {
                name: Some("Bangladesh".to_string()),
                code: Some("BD".to_string()),
                flag: Some("🇧🇩".to_string()),
            },
            RawCountry {
                name: Some("United States".to_string()),
                code: Some("US".to_string()),
                flag: Some("🇺🇸".to_string()),
            },
        ])
    }

    async fn fetch_categories(&self) -> SourceResult<Vec<RawCategory>> {
        self.check("categories.json", true)?;
        Ok(vec![RawCategory {
            id: Some("general".to_string()),
            name: Some("General".to_string()),
        }])
    }
}
