//! Host-facing catalog API
//!
//! What the presentation layer calls: every operation reads through the
//! [`CatalogCache`] and then runs a pure [`CatalogQueryEngine`] function over
//! the snapshot it got back.

use std::sync::Arc;
use tracing::debug;

use super::cache::CatalogCache;
use super::query::{CatalogQueryEngine, CuratedView};
use crate::config::{CatalogConfig, Config};
use crate::errors::{AppError, AppResult};
use crate::models::{Category, Channel, ChannelFilters, ChannelPage, Country};
use crate::sources::{HttpIndexClient, IndexSource};
use crate::utils::clock::{Clock, SystemClock};

pub struct CatalogService<S, C = SystemClock> {
    cache: CatalogCache<S, C>,
    curated: CuratedView,
    related_limit: usize,
}

impl CatalogService<HttpIndexClient, SystemClock> {
    /// Service talking to the configured remote index
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let client = HttpIndexClient::new(&config.index)?;
        Ok(Self::new(client, config))
    }
}

impl<S: IndexSource> CatalogService<S, SystemClock> {
    pub fn new(source: S, config: &Config) -> Self {
        Self::with_cache(CatalogCache::new(source, config.cache.ttl), &config.catalog)
    }
}

impl<S: IndexSource, C: Clock> CatalogService<S, C> {
    pub fn with_cache(cache: CatalogCache<S, C>, config: &CatalogConfig) -> Self {
        Self {
            cache,
            curated: CuratedView::new(&config.curated),
            related_limit: config.related_limit,
        }
    }

    pub fn cache(&self) -> &CatalogCache<S, C> {
        &self.cache
    }

    pub async fn get_channels(&self) -> Arc<Vec<Channel>> {
        self.cache.get_channels().await
    }

    pub async fn get_countries(&self) -> Arc<Vec<Country>> {
        self.cache.get_countries().await
    }

    pub async fn get_categories(&self) -> Arc<Vec<Category>> {
        self.cache.get_categories().await
    }

    /// The curated discovery view, unpaged
    pub async fn get_initial_channels(&self) -> Vec<Channel> {
        let channels = self.get_channels().await;
        let initial = CatalogQueryEngine::curated(&channels, &self.curated);
        debug!("Initial filtered channels: {}", initial.len());
        initial
    }

    /// The curated discovery view, windowed like any other query
    pub async fn get_initial_page(&self, page: usize, page_size: usize) -> ChannelPage {
        let channels = self.get_channels().await;
        CatalogQueryEngine::query_curated(&channels, &self.curated, page, page_size)
    }

    /// Free-text search; a blank term returns the whole catalog
    pub async fn search_channels(&self, term: &str) -> Vec<Channel> {
        let channels = self.get_channels().await;
        CatalogQueryEngine::filter(&channels, &ChannelFilters::new().search(term))
    }

    /// Country / category / language filters, unpaged
    pub async fn filter_channels(&self, filters: &ChannelFilters) -> Vec<Channel> {
        let channels = self.get_channels().await;
        debug!(?filters, total = channels.len(), "Filtering channels");
        CatalogQueryEngine::filter(&channels, filters)
    }

    pub async fn get_paginated_channels(
        &self,
        page: usize,
        page_size: usize,
        filters: &ChannelFilters,
    ) -> ChannelPage {
        let channels = self.get_channels().await;
        CatalogQueryEngine::query(&channels, filters, page, page_size)
    }

    /// Curated view when no filter is set, filtered query otherwise
    pub async fn browse(
        &self,
        page: usize,
        page_size: usize,
        filters: &ChannelFilters,
    ) -> ChannelPage {
        if filters.is_empty() {
            self.get_initial_page(page, page_size).await
        } else {
            self.get_paginated_channels(page, page_size, filters).await
        }
    }

    /// Look a channel up by id in the current catalog
    pub async fn find_channel(&self, id: &str) -> AppResult<Channel> {
        self.get_channels()
            .await
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("channel", id))
    }

    /// Other channels sharing the exact category or the exact country
    pub async fn related_channels(&self, channel: &Channel, limit: Option<usize>) -> Vec<Channel> {
        let limit = limit.unwrap_or(self.related_limit);
        self.get_channels()
            .await
            .iter()
            .filter(|c| {
                c.id != channel.id
                    && (c.category == channel.category || c.country == channel.country)
            })
            .take(limit)
            .cloned()
            .collect()
    }

    pub async fn clear_cache(&self) {
        self.cache.invalidate().await;
    }
}
