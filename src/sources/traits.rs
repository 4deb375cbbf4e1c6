//! Remote index abstraction
//!
//! The index is a read-only document store serving four fixed JSON arrays.
//! Implementations do transport and decoding only; field defaulting and the
//! channel/stream merge live in [`crate::catalog::CatalogResolver`].

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::SourceResult;
use crate::models::{RawCategory, RawChannel, RawCountry, RawStream};

pub const CHANNELS_DOCUMENT: &str = "channels.json";
pub const STREAMS_DOCUMENT: &str = "streams.json";
pub const COUNTRIES_DOCUMENT: &str = "countries.json";
pub const CATEGORIES_DOCUMENT: &str = "categories.json";

#[async_trait]
pub trait IndexSource: Send + Sync {
    async fn fetch_channels(&self) -> SourceResult<Vec<RawChannel>>;

    async fn fetch_streams(&self) -> SourceResult<Vec<RawStream>>;

    async fn fetch_countries(&self) -> SourceResult<Vec<RawCountry>>;

    async fn fetch_categories(&self) -> SourceResult<Vec<RawCategory>>;
}

#[async_trait]
impl<T: IndexSource + ?Sized> IndexSource for Arc<T> {
    async fn fetch_channels(&self) -> SourceResult<Vec<RawChannel>> {
        (**self).fetch_channels().await
    }

    async fn fetch_streams(&self) -> SourceResult<Vec<RawStream>> {
        (**self).fetch_streams().await
    }

    async fn fetch_countries(&self) -> SourceResult<Vec<RawCountry>> {
        (**self).fetch_countries().await
    }

    async fn fetch_categories(&self) -> SourceResult<Vec<RawCategory>> {
        (**self).fetch_categories().await
    }
}
