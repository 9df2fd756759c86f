// Runs topic extraction on the blocking pool.
//
// Each call gets its own CancelFlag. A guard owned by the request future flips
// it when the future is dropped (client disconnected) or when the timeout
// fires, and the LDA loop notices at its next pass. A pass already in flight
// always runs to completion.

use std::time::Duration;

use tracing::warn;

use crate::topics::{
    CancelFlag, CancelOnDrop, ExtractedTopic, TopicError, TopicExtractor, TopicParams,
};
use crate::web::error::ApiError;

pub async fn run_extraction(
    extractor: TopicExtractor,
    documents: Vec<String>,
    params: TopicParams,
    timeout: Duration,
) -> Result<Vec<ExtractedTopic>, ApiError> {
    let document_count = documents.len();
    offload(timeout, document_count, move |cancel| {
        extractor.extract(&documents, &params, cancel)
    })
    .await
}

/// Run `job` on the blocking pool with a fresh flag that is cancelled when
/// this future completes, times out or is dropped.
async fn offload<T, F>(timeout: Duration, document_count: usize, job: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&CancelFlag) -> Result<T, TopicError> + Send + 'static,
{
    let cancel = CancelFlag::new();
    let _guard = CancelOnDrop(cancel.clone());

    let worker = tokio::task::spawn_blocking(move || job(&cancel));

    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(result)) => result.map_err(ApiError::from),
        Ok(Err(join_error)) => Err(ApiError::Internal(format!(
            "topic worker terminated: {join_error}"
        ))),
        Err(_) => {
            warn!(
                documents = document_count,
                timeout_secs = timeout.as_secs(),
                "Topic extraction timed out, cancelling worker"
            );
            Err(ApiError::Timeout(timeout))
        }
    }
}
