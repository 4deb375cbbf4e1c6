//! Time-boxed catalog cache
//!
//! Holds the last resolved channel snapshot plus the two reference lists,
//! each with its own fetch timestamp. A request inside the freshness window is
//! served from memory; anything older triggers a refresh. A failed refresh
//! keeps whatever was there before ("serve stale on error") and is only
//! reported through the log.
//!
//! Concurrent refreshes are not collapsed: two callers that both see a stale
//! snapshot will both fetch. Snapshots are replaced wholesale, so a reader
//! holding an `Arc` never observes a half-updated collection.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::resolver::CatalogResolver;
use crate::errors::SourceResult;
use crate::models::{CatalogSnapshot, Category, Channel, Country};
use crate::sources::IndexSource;
use crate::utils::clock::{Clock, SystemClock};

/// Freshness of one cached collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheState {
    Empty,
    Fresh,
    Stale,
}

#[derive(Debug)]
struct Timestamped<T> {
    value: Arc<Vec<T>>,
    fetched_at: DateTime<Utc>,
}

impl<T> Clone for Timestamped<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
        }
    }
}

pub struct CatalogCache<S, C = SystemClock> {
    source: S,
    clock: C,
    resolver: CatalogResolver,
    ttl: chrono::Duration,
    channels: RwLock<Option<Arc<CatalogSnapshot>>>,
    countries: RwLock<Option<Timestamped<Country>>>,
    categories: RwLock<Option<Timestamped<Category>>>,
}

impl<S: IndexSource> CatalogCache<S, SystemClock> {
    pub fn new(source: S, ttl: Duration) -> Self {
        Self::with_clock(source, SystemClock, ttl)
    }
}

impl<S: IndexSource, C: Clock> CatalogCache<S, C> {
    pub fn with_clock(source: S, clock: C, ttl: Duration) -> Self {
        Self {
            source,
            clock,
            resolver: CatalogResolver::new(),
            ttl: chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX),
            channels: RwLock::new(None),
            countries: RwLock::new(None),
            categories: RwLock::new(None),
        }
    }

    /// Replace the resolver (e.g. a seeded one in tests)
    pub fn with_resolver(mut self, resolver: CatalogResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn state_of(&self, fetched_at: Option<DateTime<Utc>>) -> CacheState {
        match fetched_at {
            None => CacheState::Empty,
            Some(at) if self.clock.now() - at < self.ttl => CacheState::Fresh,
            Some(_) => CacheState::Stale,
        }
    }

    /// Freshness of the channel snapshot
    pub async fn state(&self) -> CacheState {
        let fetched_at = self.channels.read().await.as_ref().map(|s| s.fetched_at);
        self.state_of(fetched_at)
    }

    /// The current snapshot without triggering a refresh
    pub async fn snapshot(&self) -> Option<Arc<CatalogSnapshot>> {
        self.channels.read().await.clone()
    }

    /// Resolved channels, refreshed if the snapshot is missing or stale.
    ///
    /// Never fails: on a fetch error the previous snapshot (or an empty
    /// collection) is returned.
    pub async fn get_channels(&self) -> Arc<Vec<Channel>> {
        let current = self.snapshot().await;
        if let Some(snapshot) = &current {
            if self.state_of(Some(snapshot.fetched_at)) == CacheState::Fresh {
                return Arc::clone(&snapshot.channels);
            }
        }

        match self.refresh_channels().await {
            Ok(snapshot) => Arc::clone(&snapshot.channels),
            Err(e) => {
                warn!("Error fetching channels, serving last good snapshot: {}", e);
                current
                    .map(|s| Arc::clone(&s.channels))
                    .unwrap_or_default()
            }
        }
    }

    /// Fetch channels and streams, resolve, and publish a new snapshot.
    ///
    /// On error nothing is published and the previous snapshot stays in place.
    pub async fn refresh_channels(&self) -> SourceResult<Arc<CatalogSnapshot>> {
        let (raw_channels, raw_streams) =
            futures::try_join!(self.source.fetch_channels(), self.source.fetch_streams())?;

        info!(
            "Fetched {} channels and {} streams",
            raw_channels.len(),
            raw_streams.len()
        );

        let channels = self.resolver.resolve(&raw_channels, &raw_streams);
        let snapshot = Arc::new(CatalogSnapshot::new(channels, self.clock.now()));
        *self.channels.write().await = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub async fn get_countries(&self) -> Arc<Vec<Country>> {
        let current = self.countries.read().await.clone();
        if let Some(cached) = &current {
            if self.state_of(Some(cached.fetched_at)) == CacheState::Fresh {
                return Arc::clone(&cached.value);
            }
        }

        match self.source.fetch_countries().await {
            Ok(raw) => {
                let countries = Arc::new(CatalogResolver::resolve_countries(&raw));
                debug!("Loaded {} countries", countries.len());
                *self.countries.write().await = Some(Timestamped {
                    value: Arc::clone(&countries),
                    fetched_at: self.clock.now(),
                });
                countries
            }
            Err(e) => {
                warn!("Error fetching countries: {}", e);
                current.map(|c| c.value).unwrap_or_default()
            }
        }
    }

    pub async fn get_categories(&self) -> Arc<Vec<Category>> {
        let current = self.categories.read().await.clone();
        if let Some(cached) = &current {
            if self.state_of(Some(cached.fetched_at)) == CacheState::Fresh {
                return Arc::clone(&cached.value);
            }
        }

        match self.source.fetch_categories().await {
            Ok(raw) => {
                let categories = Arc::new(CatalogResolver::resolve_categories(&raw));
                debug!("Loaded {} categories", categories.len());
                *self.categories.write().await = Some(Timestamped {
                    value: Arc::clone(&categories),
                    fetched_at: self.clock.now(),
                });
                categories
            }
            Err(e) => {
                warn!("Error fetching categories: {}", e);
                current.map(|c| c.value).unwrap_or_default()
            }
        }
    }

    /// Forget everything; the next request of any kind refetches
    pub async fn invalidate(&self) {
        *self.channels.write().await = None;
        *self.countries.write().await = None;
        *self.categories.write().await = None;
        info!("Catalog cache cleared");
    }
}
