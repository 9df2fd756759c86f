use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use stayscope::config::Config;
use stayscope::dataset::loader::load_reviews;
use stayscope::dataset::models::SentimentLabel;
use stayscope::dataset::stats::dataset_stats;
use stayscope::dataset::Review;
use stayscope::topics::display::print_topics;
use stayscope::topics::{CancelFlag, TopicExtractor, TopicParams};

/// stayscope: what hotel guests talk about, by sentiment.
///
/// Loads a processed hotel-reviews CSV, fits LDA topic models over the
/// reviews and serves the results as a JSON API.
#[derive(Parser)]
#[command(name = "stayscope", version, about)]
struct Cli {
    /// Reviews CSV (overrides STAYSCOPE_DATA_PATH)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: PORT or 8000)
        #[arg(long)]
        port: Option<u16>,

        /// Address to bind (default: STAYSCOPE_BIND or 0.0.0.0)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Extract topics from the dataset and print them
    Topics {
        /// Only model reviews with this sentiment (positive, negative, neutral)
        #[arg(long)]
        sentiment: Option<SentimentLabel>,

        /// Number of topics (default: 8)
        #[arg(long, default_value = "8")]
        n_topics: usize,

        /// Vocabulary size cap (default: 6000)
        #[arg(long, default_value = "6000")]
        max_features: usize,

        /// Minimum document frequency (default: STAYSCOPE_MIN_DF or 20)
        #[arg(long)]
        min_df: Option<usize>,

        /// Maximum document-frequency fraction (default: STAYSCOPE_MAX_DF or 0.92)
        #[arg(long)]
        max_df: Option<f64>,

        /// Optimizer passes (default: 15)
        #[arg(long, default_value = "15")]
        max_iter: usize,

        /// Keywords per topic (default: STAYSCOPE_TOP_WORDS or 12)
        #[arg(long)]
        top_words: Option<usize>,

        /// Also print how many reviews each topic dominates
        #[arg(long)]
        assign: bool,
    },

    /// Show dataset statistics
    Stats,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("stayscope=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(path) = cli.data {
        config.data_path = path;
    }

    match cli.command {
        #[cfg(feature = "web")]
        Commands::Serve { port, bind } => {
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(bind) = bind {
                config.bind = bind;
            }
            stayscope::web::run_server(config).await?;
        }

        Commands::Topics {
            sentiment,
            n_topics,
            max_features,
            min_df,
            max_df,
            max_iter,
            top_words,
            assign,
        } => {
            let params = TopicParams {
                n_topics,
                max_features,
                max_df: max_df.unwrap_or(config.max_df),
                min_df: min_df.unwrap_or(config.min_df),
                n_top_words: top_words.unwrap_or(config.top_words),
                max_iter,
                random_seed: config.topic_seed,
            };
            params.validate()?;

            let reviews = load_dataset(&config).await?;
            let selected: Vec<&Review> = reviews
                .iter()
                .filter(|r| sentiment.map_or(true, |s| r.sentiment == s))
                .collect();
            let documents: Vec<String> = selected.iter().map(|r| r.text.clone()).collect();

            let title = match sentiment {
                Some(label) => format!("Topics in {label} reviews"),
                None => "Topics in all reviews".to_string(),
            };
            info!(documents = documents.len(), n_topics, "Running topic extraction");

            let extractor = TopicExtractor::with_options(&config.stopword_options());
            let (topics, assignments) = tokio::task::spawn_blocking(move || {
                let cancel = CancelFlag::new();
                if assign {
                    let (topics, assignments) =
                        extractor.extract_and_assign(&documents, &params, &cancel)?;
                    Ok::<_, stayscope::topics::TopicError>((topics, Some(assignments)))
                } else {
                    Ok((extractor.extract(&documents, &params, &cancel)?, None))
                }
            })
            .await
            .context("topic extraction worker failed")??;

            print_topics(&title, selected.len(), &topics);
            if let Some(assignments) = assignments {
                stayscope::output::terminal::display_topic_assignment(
                    &assignments,
                    &selected,
                    n_topics,
                );
            }
        }

        Commands::Stats => {
            let reviews = load_dataset(&config).await?;
            if reviews.is_empty() {
                println!("{}", "The dataset has no reviews.".yellow());
                return Ok(());
            }
            stayscope::output::terminal::display_dataset_stats(&dataset_stats(&reviews));
        }
    }

    Ok(())
}

/// Load the CSV off the async runtime.
async fn load_dataset(config: &Config) -> Result<Vec<Review>> {
    let path = config.data_path.clone();
    tokio::task::spawn_blocking(move || load_reviews(&path))
        .await
        .context("dataset loader task failed")?
}
