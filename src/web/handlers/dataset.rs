// Dataset handlers.
//
// GET  /stats           whole-dataset summary
// GET  /hotels          sorted hotel names, optional ?limit= (1-1000)
// GET  /nationalities   sorted nationalities, ?limit= (default 50, 1-500)
// POST /reviews/filter  filtered reviews with offset/limit pagination

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{check_range, load_reviews};
use crate::dataset::filters::DEFAULT_LISTING_LIMIT;
use crate::dataset::stats::{dataset_stats, distinct_hotels, distinct_nationalities, DatasetStats};
use crate::dataset::{apply_filters, FilterParams, Review};
use crate::web::{ApiError, AppState};

#[derive(Deserialize, Default)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct HotelsList {
    pub total: usize,
    pub hotels: Vec<String>,
}

#[derive(Serialize)]
pub struct NationalitiesList {
    pub total: usize,
    pub nationalities: Vec<String>,
}

#[derive(Serialize)]
pub struct ReviewsResponse {
    /// Size of the whole dataset, before filtering.
    pub total_available: usize,
    pub returned: usize,
    pub filters_applied: FilterParams,
    pub reviews: Vec<Review>,
}

pub async fn get_stats(State(state): State<AppState>) -> Result<Json<DatasetStats>, ApiError> {
    let reviews = load_reviews(&state).await?;
    Ok(Json(dataset_stats(&reviews)))
}

pub async fn list_hotels(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<HotelsList>, ApiError> {
    if let Some(limit) = query.limit {
        check_range("limit", limit, 1, 1000)?;
    }
    let reviews = load_reviews(&state).await?;
    let mut hotels = distinct_hotels(&reviews);
    if let Some(limit) = query.limit {
        hotels.truncate(limit);
    }
    Ok(Json(HotelsList {
        total: hotels.len(),
        hotels,
    }))
}

pub async fn list_nationalities(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<NationalitiesList>, ApiError> {
    let limit = query.limit.unwrap_or(50);
    check_range("limit", limit, 1, 500)?;
    let reviews = load_reviews(&state).await?;
    let mut nationalities = distinct_nationalities(&reviews);
    nationalities.truncate(limit);
    Ok(Json(NationalitiesList {
        total: nationalities.len(),
        nationalities,
    }))
}

pub async fn filter_reviews(
    State(state): State<AppState>,
    Json(filters): Json<FilterParams>,
) -> Result<Json<ReviewsResponse>, ApiError> {
    let reviews = load_reviews(&state).await?;
    let mut matched = apply_filters(&reviews, &filters);
    if filters.limit.unwrap_or(0) == 0 {
        matched.truncate(DEFAULT_LISTING_LIMIT);
    }
    info!(
        total = reviews.len(),
        returned = matched.len(),
        offset = filters.offset,
        "Filtered reviews"
    );

    Ok(Json(ReviewsResponse {
        total_available: reviews.len(),
        returned: matched.len(),
        reviews: matched.into_iter().cloned().collect(),
        filters_applied: filters,
    }))
}
