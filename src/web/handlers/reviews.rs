// Single-review analysis and word-cloud handlers.
//
// POST /reviews/analyze                         topics for one review in context
// POST /reviews/wordcloud?max_words=&sample_size=

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::topics::TopicResult;
use super::{check_range, load_reviews};
use crate::dataset::stats::{seeded_sample, word_cloud as build_word_cloud, WordCloud};
use crate::dataset::{apply_filters, FilterParams, Review};
use crate::topics::normalize::normalize_str;
use crate::topics::TopicParams;
use crate::web::offload::run_extraction;
use crate::web::{ApiError, AppState};

const MIN_INPUT_CHARS: usize = 10;
const MIN_CLEANED_CHARS: usize = 5;
/// Dataset reviews fitted alongside the submitted text.
const CONTEXT_SAMPLE: usize = 5000;

#[derive(Deserialize)]
pub struct ReviewInput {
    pub text: String,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub cleaned_text: String,
    pub topics: Vec<TopicResult>,
}

#[derive(Deserialize)]
pub struct WordCloudQuery {
    pub max_words: Option<usize>,
    pub sample_size: Option<usize>,
}

/// A lone review has too little text for LDA, so it is fitted together with a
/// seeded sample of the dataset. Topic failures degrade to an empty list.
pub async fn analyze_review(
    State(state): State<AppState>,
    Json(input): Json<ReviewInput>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    if input.text.chars().count() < MIN_INPUT_CHARS {
        return Err(ApiError::BadRequest(format!(
            "text must be at least {MIN_INPUT_CHARS} characters"
        )));
    }
    let cleaned_text = normalize_str(&input.text);
    if cleaned_text.chars().count() < MIN_CLEANED_CHARS {
        return Err(ApiError::BadRequest(
            "text is too short after cleaning".to_string(),
        ));
    }

    let topics = match context_topics(&state, &cleaned_text).await {
        Ok(topics) => topics,
        Err(e) => {
            warn!(error = %e, "Topic extraction for single review failed");
            Vec::new()
        }
    };

    Ok(Json(AnalyzeResponse {
        cleaned_text,
        topics,
    }))
}

async fn context_topics(state: &AppState, text: &str) -> Result<Vec<TopicResult>, ApiError> {
    let reviews = load_reviews(state).await?;
    let all: Vec<&Review> = reviews.iter().collect();
    let mut documents: Vec<String> = seeded_sample(&all, CONTEXT_SAMPLE, state.config.topic_seed)
        .into_iter()
        .map(|r| r.text.clone())
        .collect();
    documents.push(text.to_string());

    let params = TopicParams {
        n_topics: 3,
        max_features: 2000,
        max_df: state.config.max_df,
        min_df: state.config.min_df,
        n_top_words: state.config.top_words,
        max_iter: 10,
        random_seed: state.config.topic_seed,
    };
    let topics = run_extraction(
        state.extractor.clone(),
        documents,
        params,
        state.config.topic_timeout,
    )
    .await?;
    Ok(topics.iter().map(TopicResult::from).collect())
}

pub async fn word_cloud(
    State(state): State<AppState>,
    Query(query): Query<WordCloudQuery>,
    Json(filters): Json<FilterParams>,
) -> Result<Json<WordCloud>, ApiError> {
    let max_words = query.max_words.unwrap_or(100);
    let sample_size = query.sample_size.unwrap_or(3000);
    check_range("max_words", max_words, 10, 500)?;
    check_range("sample_size", sample_size, 100, 10_000)?;

    let reviews = load_reviews(&state).await?;
    let filtered = apply_filters(&reviews, &filters);
    if filtered.is_empty() {
        return Err(ApiError::NotFound(
            "no reviews match the given filters".to_string(),
        ));
    }

    let cloud = build_word_cloud(
        &filtered,
        state.extractor.stopwords(),
        max_words,
        sample_size,
        state.config.topic_seed,
    );
    info!(
        reviews = filtered.len(),
        distinct = cloud.total_words,
        returned = cloud.words.len(),
        "Built word cloud"
    );
    Ok(Json(cloud))
}
