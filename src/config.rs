use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::topics::stopwords::StopwordOptions;

/// Central configuration loaded from environment variables.
///
/// Every setting has a default. The .env file is loaded automatically at
/// startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Processed reviews CSV (STAYSCOPE_DATA_PATH).
    pub data_path: PathBuf,
    pub port: u16,
    pub bind: String,
    /// How long a loaded dataset is served before reloading.
    pub cache_ttl: Duration,
    /// Hard bound on a single topic extraction.
    pub topic_timeout: Duration,
    /// Seed threaded into every LDA fit and dataset sample.
    pub topic_seed: u64,
    pub min_df: usize,
    pub max_df: f64,
    pub top_words: usize,
    /// Union the larger `stop-words` English list into the stopword set.
    pub extended_stopwords: bool,
    /// Optional newline-separated file of extra stopwords.
    pub extra_stopwords: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("./data/hotel_reviews_processed.csv"),
            port: 8000,
            bind: "0.0.0.0".to_string(),
            cache_ttl: Duration::from_secs(300),
            topic_timeout: Duration::from_secs(120),
            topic_seed: 42,
            min_df: 20,
            max_df: 0.92,
            top_words: 12,
            extended_stopwords: true,
            extra_stopwords: None,
        }
    }
}

/// Parse `name` if set, keeping `default` otherwise. A set but malformed
/// value is an error rather than a silent fallback.
fn parsed<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} is not a valid value: {raw:?}")),
        _ => Ok(default),
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let defaults = Self::default();

        let max_df: f64 = parsed("STAYSCOPE_MAX_DF", defaults.max_df)?;
        if !(max_df > 0.0 && max_df <= 1.0) {
            anyhow::bail!("STAYSCOPE_MAX_DF must be in (0, 1], got {max_df}");
        }

        Ok(Self {
            data_path: env::var("STAYSCOPE_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            port: parsed("PORT", defaults.port)?,
            bind: env::var("STAYSCOPE_BIND").unwrap_or(defaults.bind),
            cache_ttl: Duration::from_secs(parsed(
                "STAYSCOPE_CACHE_TTL_SECS",
                defaults.cache_ttl.as_secs(),
            )?),
            topic_timeout: Duration::from_secs(parsed(
                "STAYSCOPE_TOPIC_TIMEOUT_SECS",
                defaults.topic_timeout.as_secs(),
            )?),
            topic_seed: parsed("STAYSCOPE_TOPIC_SEED", defaults.topic_seed)?,
            min_df: parsed("STAYSCOPE_MIN_DF", defaults.min_df)?.max(1),
            max_df,
            top_words: parsed("STAYSCOPE_TOP_WORDS", defaults.top_words)?.max(1),
            extended_stopwords: parsed("STAYSCOPE_EXTENDED_STOPWORDS", defaults.extended_stopwords)?,
            extra_stopwords: env::var("STAYSCOPE_EXTRA_STOPWORDS")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn stopword_options(&self) -> StopwordOptions {
        StopwordOptions {
            extended: self.extended_stopwords,
            extra_path: self.extra_stopwords.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Each test uses its own variable names so parallel tests never race on
    // the process environment.

    #[test]
    fn test_parsed_default_when_unset() {
        assert_eq!(parsed("STAYSCOPE_TEST_UNSET_PORT", 8000u16).unwrap(), 8000);
    }

    #[test]
    fn test_parsed_reads_value() {
        env::set_var("STAYSCOPE_TEST_SEED", " 7 ");
        assert_eq!(parsed("STAYSCOPE_TEST_SEED", 42u64).unwrap(), 7);
    }

    #[test]
    fn test_parsed_rejects_garbage_with_variable_name() {
        env::set_var("STAYSCOPE_TEST_TTL", "five minutes");
        let err = parsed("STAYSCOPE_TEST_TTL", 300u64).unwrap_err();
        assert!(err.to_string().contains("STAYSCOPE_TEST_TTL"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.topic_seed, 42);
        assert!(config.stopword_options().extended);
    }
}
