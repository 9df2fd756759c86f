// Metric handlers.
//
// POST /metrics/aggregated              summary metrics over a filtered subset
// POST /metrics/distribution?metric=    counts per sentiment|score|hotel|nationality

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::load_reviews;
use crate::dataset::stats::{self, AggregatedMetrics, Distribution, DistributionMetric};
use crate::dataset::{apply_filters, FilterParams};
use crate::web::{ApiError, AppState};

#[derive(Deserialize)]
pub struct DistributionQuery {
    pub metric: String,
}

pub async fn aggregated(
    State(state): State<AppState>,
    Json(filters): Json<FilterParams>,
) -> Result<Json<AggregatedMetrics>, ApiError> {
    let reviews = load_reviews(&state).await?;
    let filtered = apply_filters(&reviews, &filters);
    Ok(Json(stats::aggregated_metrics(&filtered, &filters)))
}

pub async fn distribution(
    State(state): State<AppState>,
    Query(query): Query<DistributionQuery>,
    Json(filters): Json<FilterParams>,
) -> Result<Json<Distribution>, ApiError> {
    let metric: DistributionMetric = query.metric.parse().map_err(ApiError::BadRequest)?;
    let reviews = load_reviews(&state).await?;
    let filtered = apply_filters(&reviews, &filters);
    Ok(Json(stats::distribution(&filtered, metric)))
}
