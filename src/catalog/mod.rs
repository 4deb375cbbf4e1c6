//! Channel catalog: resolution, caching and querying

pub mod cache;
pub mod query;
pub mod resolver;
pub mod service;

#[cfg(test)]
pub(crate) mod testing;

pub use cache::{CacheState, CatalogCache};
pub use query::{CatalogQueryEngine, CuratedView};
pub use resolver::CatalogResolver;
pub use service::CatalogService;
