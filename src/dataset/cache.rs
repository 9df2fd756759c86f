// Time-bounded cache of the loaded dataset.
//
// The repository owns a (reviews, loaded_at) pair. Reads inside the TTL share
// the same Arc; the first read after expiry reloads on a blocking worker while
// holding the lock, so concurrent readers wait for one reload instead of
// starting their own.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::loader::load_reviews;
use super::models::Review;

/// Source of "now" for TTL decisions.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Produces the full review set. Called from a blocking worker.
pub trait ReviewLoader: Send + Sync {
    fn load(&self) -> Result<Vec<Review>>;
}

/// Loads the processed CSV from disk.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    pub path: PathBuf,
}

impl ReviewLoader for CsvLoader {
    fn load(&self) -> Result<Vec<Review>> {
        load_reviews(&self.path)
    }
}

/// Serves a fixed, already-built review set.
#[derive(Debug, Clone)]
pub struct StaticLoader(pub Vec<Review>);

impl ReviewLoader for StaticLoader {
    fn load(&self) -> Result<Vec<Review>> {
        Ok(self.0.clone())
    }
}

struct Cached {
    reviews: Arc<Vec<Review>>,
    loaded_at: Instant,
}

pub struct ReviewRepository {
    loader: Arc<dyn ReviewLoader>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
    cached: Mutex<Option<Cached>>,
}

impl ReviewRepository {
    pub fn new(loader: Arc<dyn ReviewLoader>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            loader,
            clock,
            ttl,
            cached: Mutex::new(None),
        }
    }

    /// CSV-backed repository on the system clock.
    pub fn from_csv(path: PathBuf, ttl: Duration) -> Self {
        Self::new(Arc::new(CsvLoader { path }), Arc::new(SystemClock), ttl)
    }

    /// The cached reviews, reloading first if they are missing or expired.
    pub async fn get(&self) -> Result<Arc<Vec<Review>>> {
        let mut cached = self.cached.lock().await;
        let now = self.clock.now();

        if let Some(entry) = cached.as_ref() {
            if now.saturating_duration_since(entry.loaded_at) < self.ttl {
                debug!("Serving reviews from cache");
                return Ok(Arc::clone(&entry.reviews));
            }
        }

        let loader = Arc::clone(&self.loader);
        let reviews = tokio::task::spawn_blocking(move || loader.load())
            .await
            .context("dataset loader task failed")??;
        let reviews = Arc::new(reviews);
        info!(reviews = reviews.len(), "Dataset cache refreshed");

        *cached = Some(Cached {
            reviews: Arc::clone(&reviews),
            loaded_at: self.clock.now(),
        });
        Ok(reviews)
    }

    /// Time since the last successful load, if there has been one.
    pub async fn age(&self) -> Option<Duration> {
        let cached = self.cached.lock().await;
        cached
            .as_ref()
            .map(|entry| self.clock.now().saturating_duration_since(entry.loaded_at))
    }
}
