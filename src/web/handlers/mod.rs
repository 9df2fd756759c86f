// Route handlers, grouped by the resource they serve.

pub mod dataset;
pub mod metrics;
pub mod reviews;
pub mod topics;

use std::sync::Arc;

use crate::dataset::Review;
use crate::web::{ApiError, AppState};

/// Current dataset from the cache, as an API error if it cannot be loaded.
pub(crate) async fn load_reviews(state: &AppState) -> Result<Arc<Vec<Review>>, ApiError> {
    state
        .repo
        .get()
        .await
        .map_err(|e| ApiError::Internal(format!("error loading dataset: {e:#}")))
}

/// Reject `value` unless it lies in `min..=max`.
pub(crate) fn check_range(name: &str, value: usize, min: usize, max: usize) -> Result<(), ApiError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(format!(
            "{name} must be between {min} and {max}, got {value}"
        )))
    }
}
