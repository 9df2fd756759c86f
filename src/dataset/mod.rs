// Reviews dataset: loading, caching, filtering and statistics.

pub mod cache;
pub mod filters;
pub mod loader;
pub mod models;
pub mod stats;

pub use cache::{Clock, ReviewLoader, ReviewRepository, StaticLoader, SystemClock};
pub use filters::{apply_filters, FilterParams};
pub use models::{Review, SentimentLabel};
