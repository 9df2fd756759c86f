// Topic extraction orchestrator.
//
// Wires stopwords -> vectorizer -> LDA -> summarizer into one call. Every call
// builds its own vocabulary and model; the only shared state is the immutable
// stopword set, so concurrent extractions need no locking.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::info;

use super::cancel::CancelFlag;
use super::error::TopicError;
use super::lda::{self, LdaModel, LdaOptions};
use super::stopwords::{build_stopwords, build_stopwords_with, StopwordOptions};
use super::summarize::summarize;
use super::vectorizer::{vectorize, DocTermMatrix, VectorizerOptions};

/// Parameters for one extraction. All fields are required inputs; the
/// defaults are the values the dashboard uses for a large corpus.
///
/// Safe ranges: `n_topics` 3-15, `max_features` 2000-6000, `max_df` 0.8-1.0,
/// `min_df` 1-20 (keep it under ~5% of the corpus for filtered subsets, or the
/// vocabulary can empty out), `max_iter` 10-15.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicParams {
    pub n_topics: usize,
    pub max_features: usize,
    pub max_df: f64,
    pub min_df: usize,
    pub n_top_words: usize,
    pub max_iter: usize,
    pub random_seed: u64,
}

impl Default for TopicParams {
    fn default() -> Self {
        Self {
            n_topics: 8,
            max_features: 6000,
            max_df: 0.92,
            min_df: 20,
            n_top_words: 12,
            max_iter: 15,
            random_seed: 42,
        }
    }
}

impl TopicParams {
    /// Reject parameter combinations no extraction can run with.
    pub fn validate(&self) -> Result<(), TopicError> {
        let problem = if self.n_topics < 1 {
            "n_topics must be at least 1".to_string()
        } else if self.max_features < 1 {
            "max_features must be at least 1".to_string()
        } else if !(self.max_df > 0.0 && self.max_df <= 1.0) {
            format!("max_df must be in (0, 1], got {}", self.max_df)
        } else if self.min_df < 1 {
            "min_df must be at least 1".to_string()
        } else if self.n_top_words < 1 {
            "n_top_words must be at least 1".to_string()
        } else if self.max_iter < 1 {
            "max_iter must be at least 1".to_string()
        } else {
            return Ok(());
        };
        Err(TopicError::InvalidInput(problem))
    }

    fn vectorizer_options(&self) -> VectorizerOptions {
        VectorizerOptions {
            max_features: self.max_features,
            max_df: self.max_df,
            min_df: self.min_df,
        }
    }

    fn lda_options(&self) -> LdaOptions {
        LdaOptions::new(self.n_topics, self.max_iter, self.random_seed)
    }
}

/// One topic: its 1-based id and keywords in descending weight order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTopic {
    pub topic_id: usize,
    pub keywords: Vec<String>,
}

impl ExtractedTopic {
    /// Keywords as the API exposes them: `"breakfast, staff, clean"`.
    pub fn keywords_joined(&self) -> String {
        self.keywords.join(", ")
    }
}

/// Dominant topic of one document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentTopic {
    /// 1-based, matching [`ExtractedTopic::topic_id`] from the same fit.
    pub dominant_topic: usize,
    pub probability: f64,
}

/// Runs extractions against a fixed stopword set.
#[derive(Debug, Clone)]
pub struct TopicExtractor {
    stopwords: Arc<HashSet<String>>,
}

impl Default for TopicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

struct Fitted {
    model: LdaModel,
    matrix: DocTermMatrix,
    vocabulary: Vec<String>,
}

impl Fitted {
    fn topics(&self, n_top_words: usize) -> Result<Vec<ExtractedTopic>, TopicError> {
        let keywords = summarize(&self.model.components, &self.vocabulary, n_top_words)?;
        Ok(keywords
            .into_iter()
            .enumerate()
            .map(|(i, keywords)| ExtractedTopic {
                topic_id: i + 1,
                keywords,
            })
            .collect())
    }

    fn dominant_topics(&self) -> Result<Vec<DocumentTopic>, TopicError> {
        let distribution = self.model.transform(&self.matrix)?;
        Ok(distribution
            .iter()
            .map(|row| {
                let (index, probability) = row.iter().copied().enumerate().fold(
                    (0, f64::NEG_INFINITY),
                    |best, (i, p)| if p > best.1 { (i, p) } else { best },
                );
                DocumentTopic {
                    dominant_topic: index + 1,
                    probability,
                }
            })
            .collect())
    }
}

impl TopicExtractor {
    /// Extractor with the built-in and extended stopword lists.
    pub fn new() -> Self {
        Self::with_stopwords(Arc::new(build_stopwords()))
    }

    pub fn with_options(options: &StopwordOptions) -> Self {
        Self::with_stopwords(Arc::new(build_stopwords_with(options)))
    }

    pub fn with_stopwords(stopwords: Arc<HashSet<String>>) -> Self {
        Self { stopwords }
    }

    pub fn stopwords(&self) -> &HashSet<String> {
        &self.stopwords
    }

    /// Fit a topic model over `documents` and summarize each topic.
    ///
    /// Returns exactly `params.n_topics` topics with ids `1..=n_topics`. Fails
    /// with `InvalidInput` on an empty collection or bad parameters and with
    /// `EmptyVocabulary` when nothing survives pruning; both happen before any
    /// model fitting.
    pub fn extract(
        &self,
        documents: &[String],
        params: &TopicParams,
        cancel: &CancelFlag,
    ) -> Result<Vec<ExtractedTopic>, TopicError> {
        let fitted = self.fit(documents, params, cancel)?;
        fitted.topics(params.n_top_words)
    }

    /// Fit a topic model and report each document's dominant topic.
    ///
    /// Ties in the document-topic distribution go to the lowest topic id.
    pub fn assign(
        &self,
        documents: &[String],
        params: &TopicParams,
        cancel: &CancelFlag,
    ) -> Result<Vec<DocumentTopic>, TopicError> {
        self.fit(documents, params, cancel)?.dominant_topics()
    }

    /// [`extract`](Self::extract) and [`assign`](Self::assign) from a single fit.
    pub fn extract_and_assign(
        &self,
        documents: &[String],
        params: &TopicParams,
        cancel: &CancelFlag,
    ) -> Result<(Vec<ExtractedTopic>, Vec<DocumentTopic>), TopicError> {
        let fitted = self.fit(documents, params, cancel)?;
        Ok((fitted.topics(params.n_top_words)?, fitted.dominant_topics()?))
    }

    fn fit(
        &self,
        documents: &[String],
        params: &TopicParams,
        cancel: &CancelFlag,
    ) -> Result<Fitted, TopicError> {
        if documents.is_empty() {
            return Err(TopicError::InvalidInput(
                "no documents to extract topics from".to_string(),
            ));
        }
        params.validate()?;

        info!(
            documents = documents.len(),
            n_topics = params.n_topics,
            max_iter = params.max_iter,
            "Extracting topics"
        );

        let (matrix, vocabulary) =
            vectorize(documents, &self.stopwords, &params.vectorizer_options());
        if vocabulary.is_empty() {
            return Err(TopicError::EmptyVocabulary {
                documents: documents.len(),
            });
        }
        info!(
            vocabulary = vocabulary.len(),
            nonzero = matrix.nnz(),
            "Built document-term matrix"
        );

        let model = lda::fit(&matrix, &params.lda_options(), cancel)?;
        info!(
            iterations = model.n_iter,
            topics = model.n_topics(),
            "Topic model fitted"
        );

        Ok(Fitted {
            model,
            matrix,
            vocabulary,
        })
    }
}

/// One-shot extraction with the default stopword set and no cancellation.
pub fn extract_topics(
    documents: &[String],
    params: &TopicParams,
) -> Result<Vec<ExtractedTopic>, TopicError> {
    TopicExtractor::new().extract(documents, params, &CancelFlag::new())
}

/// One-shot dominant-topic assignment with the default stopword set.
pub fn assign_topics(
    documents: &[String],
    params: &TopicParams,
) -> Result<Vec<DocumentTopic>, TopicError> {
    TopicExtractor::new().assign(documents, params, &CancelFlag::new())
}
