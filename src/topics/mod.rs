// Topic extraction: normalization, vectorization, LDA and summarization.

pub mod cancel;
pub mod display;
pub mod error;
pub mod extract;
pub mod lda;
pub mod normalize;
pub mod stopwords;
pub mod summarize;
pub mod vectorizer;

pub use cancel::{CancelFlag, CancelOnDrop};
pub use error::TopicError;
pub use extract::{
    assign_topics, extract_topics, DocumentTopic, ExtractedTopic, TopicExtractor, TopicParams,
};
