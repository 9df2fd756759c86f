// Error taxonomy for topic extraction.
//
// InvalidInput and EmptyVocabulary are caller-side conditions (bad request vs
// not enough signal in the data). FitFailure and ShapeMismatch are internal.
// Cancelled means the caller abandoned the request mid-fit.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TopicError {
    /// The request itself is unusable: empty corpus or out-of-range parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every token was filtered out by stopwords or document-frequency bounds.
    #[error(
        "no terms remain after stopword and frequency filtering of {documents} documents; \
         try a lower min_df or a larger document set"
    )]
    EmptyVocabulary { documents: usize },

    /// The optimizer could not proceed (numerical degeneracy).
    #[error("topic model fit failed on {documents} documents x {vocabulary} terms: {reason}")]
    FitFailure {
        documents: usize,
        vocabulary: usize,
        reason: String,
    },

    /// Cooperative cancellation was requested between optimizer passes.
    #[error("topic extraction cancelled after {completed} of {max_iter} iterations")]
    Cancelled { completed: usize, max_iter: usize },

    /// The topic-term matrix and the vocabulary disagree in width.
    #[error("topic weights have {found} columns but the vocabulary has {expected} terms")]
    ShapeMismatch { expected: usize, found: usize },
}

impl TopicError {
    /// Whether the failure should be reported to the caller as a 4xx condition.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TopicError::InvalidInput(_) | TopicError::EmptyVocabulary { .. }
        )
    }
}
