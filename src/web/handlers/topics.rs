// POST /reviews/topics?n_topics=&min_df=&max_df=
//
// Topics per sentiment over a filtered subset. The positive and negative
// groups are fitted concurrently, each on its own blocking worker.

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{check_range, load_reviews};
use crate::dataset::{apply_filters, FilterParams, SentimentLabel};
use crate::topics::display::topic_line;
use crate::topics::{ExtractedTopic, TopicError, TopicParams};
use crate::web::offload::run_extraction;
use crate::web::{ApiError, AppState};

/// Fewer filtered reviews than this and the request is rejected.
pub const MIN_FILTERED_REVIEWS: usize = 100;
/// A sentiment group needs at least this many reviews to be modelled.
pub const MIN_GROUP_REVIEWS: usize = 50;

/// A topic as the API exposes it: keywords joined with ", ".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopicResult {
    pub topic_id: usize,
    pub keywords: String,
}

impl From<&ExtractedTopic> for TopicResult {
    fn from(topic: &ExtractedTopic) -> Self {
        Self {
            topic_id: topic.topic_id,
            keywords: topic.keywords_joined(),
        }
    }
}

#[derive(Deserialize, Default)]
pub struct TopicsQuery {
    pub n_topics: Option<usize>,
    pub min_df: Option<usize>,
    pub max_df: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct SentimentTopics {
    pub sentiment_type: SentimentLabel,
    pub total_reviews: usize,
    pub topics: Vec<TopicResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped_reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TopicsAggregateResponse {
    pub positive_topics: SentimentTopics,
    pub negative_topics: SentimentTopics,
    pub total_reviews_analyzed: usize,
}

pub async fn aggregated_topics(
    State(state): State<AppState>,
    Query(query): Query<TopicsQuery>,
    Json(filters): Json<FilterParams>,
) -> Result<Json<TopicsAggregateResponse>, ApiError> {
    let n_topics = query.n_topics.unwrap_or(5);
    check_range("n_topics", n_topics, 3, 15)?;
    let params = TopicParams {
        n_topics,
        max_features: 3000,
        max_df: query.max_df.unwrap_or(state.config.max_df),
        min_df: query.min_df.unwrap_or(state.config.min_df),
        n_top_words: state.config.top_words,
        max_iter: 15,
        random_seed: state.config.topic_seed,
    };
    params.validate()?;

    let reviews = load_reviews(&state).await?;
    let filtered = apply_filters(&reviews, &filters);
    if filtered.len() < MIN_FILTERED_REVIEWS {
        return Err(ApiError::BadRequest(format!(
            "too few reviews after filtering ({}); at least {MIN_FILTERED_REVIEWS} are needed",
            filtered.len()
        )));
    }

    let texts = |label: SentimentLabel| -> Vec<String> {
        filtered
            .iter()
            .filter(|r| r.sentiment == label)
            .map(|r| r.text.clone())
            .collect()
    };
    let positive = texts(SentimentLabel::Positive);
    let negative = texts(SentimentLabel::Negative);

    if positive.len() < MIN_GROUP_REVIEWS && negative.len() < MIN_GROUP_REVIEWS {
        return Err(ApiError::NotFound(
            "not enough positive or negative reviews to extract topics".to_string(),
        ));
    }

    let (positive_topics, negative_topics) = tokio::try_join!(
        group_topics(&state, SentimentLabel::Positive, positive, params.clone()),
        group_topics(&state, SentimentLabel::Negative, negative, params),
    )?;

    Ok(Json(TopicsAggregateResponse {
        positive_topics,
        negative_topics,
        total_reviews_analyzed: filtered.len(),
    }))
}

async fn group_topics(
    state: &AppState,
    label: SentimentLabel,
    documents: Vec<String>,
    params: TopicParams,
) -> Result<SentimentTopics, ApiError> {
    let total_reviews = documents.len();
    let skipped = |reason: String| SentimentTopics {
        sentiment_type: label,
        total_reviews,
        topics: Vec::new(),
        skipped_reason: Some(reason),
    };

    if total_reviews < MIN_GROUP_REVIEWS {
        return Ok(skipped(format!(
            "fewer than {MIN_GROUP_REVIEWS} {label} reviews"
        )));
    }

    info!(sentiment = %label, reviews = total_reviews, "Extracting sentiment topics");
    match run_extraction(
        state.extractor.clone(),
        documents,
        params,
        state.config.topic_timeout,
    )
    .await
    {
        Ok(topics) => {
            for topic in &topics {
                debug!(sentiment = %label, "{}", topic_line(topic));
            }
            Ok(SentimentTopics {
                sentiment_type: label,
                total_reviews,
                topics: topics.iter().map(TopicResult::from).collect(),
                skipped_reason: None,
            })
        }
        Err(ApiError::Topic(err @ TopicError::EmptyVocabulary { .. })) => {
            Ok(skipped(err.to_string()))
        }
        Err(e) => Err(e),
    }
}
