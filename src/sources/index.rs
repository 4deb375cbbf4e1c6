//! HTTP client for the public channel index
//!
//! Fetches whole documents on every call; there is no paging or conditional
//! request support on the remote side, which is why the catalog cache exists.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::traits::*;
use crate::config::IndexConfig;
use crate::errors::{SourceError, SourceResult};
use crate::models::{RawCategory, RawChannel, RawCountry, RawStream};
use crate::utils::url::UrlUtils;

/// reqwest-backed [`IndexSource`]
pub struct HttpIndexClient {
    client: Client,
    base_url: String,
}

impl HttpIndexClient {
    pub fn new(config: &IndexConfig) -> SourceResult<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .map_err(|e| SourceError::request(&config.base_url, e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Use a preconfigured reqwest client
    pub fn with_client<S: Into<String>>(client: Client, base_url: S) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch a document and decode it as an array of records.
    ///
    /// The array itself must be well formed; individual records that fail to
    /// decode are replaced by `T::default()` and counted in a warning.
    async fn fetch_records<T>(&self, document: &str) -> SourceResult<Vec<T>>
    where
        T: DeserializeOwned + Default,
    {
        let url = UrlUtils::document_url(&self.base_url, document)
            .map_err(|e| SourceError::invalid_url(&self.base_url, e.to_string()))?;
        let display_url = UrlUtils::obfuscate_credentials(url.as_str());

        debug!("Fetching index document from: {}", display_url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| {
                SourceError::request(&display_url, UrlUtils::obfuscate_credentials(&e.to_string()))
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::http(status.as_u16(), display_url));
        }

        let bytes = response.bytes().await.map_err(|e| {
            SourceError::request(&display_url, format!("Failed to read response: {e}"))
        })?;

        let values: Vec<Value> = serde_json::from_slice(&bytes)
            .map_err(|e| SourceError::decode(document, e.to_string()))?;

        let records = decode_records(document, values);
        debug!("Decoded {} records from {}", records.len(), document);
        Ok(records)
    }
}

/// Decode each array member on its own so one bad record cannot sink the document
pub(crate) fn decode_records<T>(document: &str, values: Vec<Value>) -> Vec<T>
where
    T: DeserializeOwned + Default,
{
    let mut defaulted = 0usize;
    let records: Vec<T> = values
        .into_iter()
        .map(|value| {
            serde_json::from_value(value).unwrap_or_else(|_| {
                defaulted += 1;
                T::default()
            })
        })
        .collect();

    if defaulted > 0 {
        warn!(
            document,
            defaulted, "Some index records were malformed and replaced with defaults"
        );
    }
    records
}

#[async_trait]
impl IndexSource for HttpIndexClient {
    async fn fetch_channels(&self) -> SourceResult<Vec<RawChannel>> {
        self.fetch_records(CHANNELS_DOCUMENT).await
    }

    async fn fetch_streams(&self) -> SourceResult<Vec<RawStream>> {
        self.fetch_records(STREAMS_DOCUMENT).await
    }

    async fn fetch_countries(&self) -> SourceResult<Vec<RawCountry>> {
        self.fetch_records(COUNTRIES_DOCUMENT).await
    }

    async fn fetch_categories(&self) -> SourceResult<Vec<RawCategory>> {
        self.fetch_records(CATEGORIES_DOCUMENT).await
    }
}
