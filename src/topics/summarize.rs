// Topic summarizer: highest-weighted terms per topic.

use std::cmp::Ordering;

use super::error::TopicError;

/// For each topic row, the `n_top_words` terms with the largest weight.
///
/// Order is descending weight; equal weights fall back to ascending column
/// index (alphabetical, given how the vectorizer assigns columns). Topic order
/// follows row order. A vocabulary smaller than `n_top_words` returns every
/// term without padding.
pub fn summarize(
    topic_term_weights: &[Vec<f64>],
    vocabulary: &[String],
    n_top_words: usize,
) -> Result<Vec<Vec<String>>, TopicError> {
    topic_term_weights
        .iter()
        .map(|row| {
            if row.len() != vocabulary.len() {
                return Err(TopicError::ShapeMismatch {
                    expected: vocabulary.len(),
                    found: row.len(),
                });
            }
            let mut order: Vec<usize> = (0..row.len()).collect();
            order.sort_by(|&a, &b| match row[b].total_cmp(&row[a]) {
                Ordering::Equal => a.cmp(&b),
                other => other,
            });
            Ok(order
                .into_iter()
                .take(n_top_words)
                .map(|i| vocabulary[i].clone())
                .collect())
        })
        .collect()
}
