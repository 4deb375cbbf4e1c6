//! Remote index access

pub mod index;
pub mod traits;

pub use index::HttpIndexClient;
pub use traits::{
    IndexSource, CATEGORIES_DOCUMENT, CHANNELS_DOCUMENT, COUNTRIES_DOCUMENT, STREAMS_DOCUMENT,
};
