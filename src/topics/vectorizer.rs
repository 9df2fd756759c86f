// Count vectorizer: documents to a sparse document-term matrix.
//
// Tokens are maximal runs of alphabetic characters, lowercased, at least three
// characters long. Vocabulary pruning, in order:
//   1. drop stopwords
//   2. drop tokens with document frequency < min_df (absolute count)
//   3. drop tokens with document frequency > max_df * n_documents
//   4. if more than max_features remain, keep the highest total-count tokens,
//      ties broken alphabetically
// Surviving terms get column indices in alphabetical order, so ascending
// column index and alphabetical order agree everywhere downstream.

use std::collections::{HashMap, HashSet};

/// Minimum token length in characters.
pub const MIN_TOKEN_LEN: usize = 3;

/// Sparse matrix in compressed-row form. Rows are documents, columns are
/// vocabulary terms, cells are raw counts. Column indices within a row are
/// strictly increasing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocTermMatrix {
    n_terms: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    counts: Vec<u32>,
}

impl DocTermMatrix {
    /// Build from per-row `(column, count)` entries. Zero counts are dropped
    /// and each row is sorted by column.
    pub fn from_rows(n_terms: usize, rows: Vec<Vec<(usize, u32)>>) -> Self {
        let mut indptr = Vec::with_capacity(rows.len() + 1);
        let mut indices = Vec::new();
        let mut counts = Vec::new();
        indptr.push(0);
        for mut row in rows {
            row.retain(|&(_, c)| c > 0);
            row.sort_unstable_by_key(|&(col, _)| col);
            for (col, count) in row {
                debug_assert!(col < n_terms);
                indices.push(col);
                counts.push(count);
            }
            indptr.push(indices.len());
        }
        Self {
            n_terms,
            indptr,
            indices,
            counts,
        }
    }

    pub fn n_documents(&self) -> usize {
        self.indptr.len() - 1
    }

    pub fn n_terms(&self) -> usize {
        self.n_terms
    }

    /// Number of stored (non-zero) cells.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    /// Column indices and counts of the non-zero cells of row `doc`.
    pub fn row(&self, doc: usize) -> (&[usize], &[u32]) {
        let (start, end) = (self.indptr[doc], self.indptr[doc + 1]);
        (&self.indices[start..end], &self.counts[start..end])
    }

    pub fn get(&self, doc: usize, term: usize) -> u32 {
        let (cols, counts) = self.row(doc);
        match cols.binary_search(&term) {
            Ok(pos) => counts[pos],
            Err(_) => 0,
        }
    }
}

/// Pruning parameters for [`vectorize`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorizerOptions {
    pub max_features: usize,
    /// Upper document-frequency bound as a fraction of the corpus, in (0, 1].
    pub max_df: f64,
    /// Lower document-frequency bound as an absolute document count.
    pub min_df: usize,
}

/// Split text into lowercase alphabetic tokens of at least [`MIN_TOKEN_LEN`]
/// characters. Digits and punctuation act as separators.
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN)
        .map(str::to_lowercase)
}

/// Build the document-term matrix and its vocabulary.
///
/// An empty collection, or one where nothing survives pruning, yields an
/// empty vocabulary; deciding whether that is an error is the caller's job.
pub fn vectorize(
    documents: &[String],
    stopwords: &HashSet<String>,
    options: &VectorizerOptions,
) -> (DocTermMatrix, Vec<String>) {
    let per_doc: Vec<HashMap<String, u32>> = documents
        .iter()
        .map(|doc| {
            let mut counts = HashMap::new();
            for token in tokenize(doc) {
                *counts.entry(token).or_insert(0) += 1;
            }
            counts
        })
        .collect();

    let mut doc_freq: HashMap<&str, usize> = HashMap::new();
    let mut total_freq: HashMap<&str, u64> = HashMap::new();
    for counts in &per_doc {
        for (token, &count) in counts {
            *doc_freq.entry(token.as_str()).or_insert(0) += 1;
            *total_freq.entry(token.as_str()).or_insert(0) += u64::from(count);
        }
    }

    let max_doc_count = options.max_df * documents.len() as f64;
    let mut candidates: Vec<(&str, u64)> = doc_freq
        .iter()
        .filter(|&(token, &df)| {
            !stopwords.contains(*token) && df >= options.min_df && df as f64 <= max_doc_count
        })
        .map(|(token, _)| (*token, total_freq[token]))
        .collect();

    if candidates.len() > options.max_features {
        candidates.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        candidates.truncate(options.max_features);
    }

    let mut vocabulary: Vec<String> = candidates.iter().map(|(t, _)| t.to_string()).collect();
    vocabulary.sort_unstable();
    let column: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let rows = per_doc
        .iter()
        .map(|counts| {
            counts
                .iter()
                .filter_map(|(token, &count)| column.get(token.as_str()).map(|&c| (c, count)))
                .collect()
        })
        .collect();

    (DocTermMatrix::from_rows(vocabulary.len(), rows), vocabulary)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(max_features: usize, max_df: f64, min_df: usize) -> VectorizerOptions {
        VectorizerOptions {
            max_features,
            max_df,
            min_df,
        }
    }

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_tokenize_splits_on_digits_and_punctuation() {
        let tokens: Vec<String> = tokenize("Wi-Fi was 10/10, BREAKFAST2go ok!").collect();
        assert_eq!(tokens, vec!["was", "breakfast"]);
    }

    #[test]
    fn test_empty_collection() {
        let (m, vocab) = vectorize(&[], &HashSet::new(), &opts(10, 1.0, 1));
        assert_eq!(m.n_documents(), 0);
        assert!(vocab.is_empty());
    }

    #[test]
    fn test_counts_and_alphabetical_columns() {
        let d = docs(&["pool pool spa", "spa gym"]);
        let (m, vocab) = vectorize(&d, &HashSet::new(), &opts(10, 1.0, 1));
        assert_eq!(vocab, vec!["gym", "pool", "spa"]);
        assert_eq!(m.get(0, 1), 2);
        assert_eq!(m.get(0, 2), 1);
        assert_eq!(m.get(0, 0), 0);
        assert_eq!(m.get(1, 0), 1);
        assert_eq!(m.nnz(), 4);
    }

    #[test]
    fn test_stopwords_excluded() {
        let stop: HashSet<String> = ["pool".to_string()].into();
        let (_, vocab) = vectorize(&docs(&["pool spa"]), &stop, &opts(10, 1.0, 1));
        assert_eq!(vocab, vec!["spa"]);
    }

    #[test]
    fn test_min_df_and_max_df() {
        let d = docs(&["bar spa", "bar gym", "bar spa", "bar"]);
        // bar: df 4 (> 0.9 * 4 = 3.6), spa: df 2, gym: df 1
        let (_, vocab) = vectorize(&d, &HashSet::new(), &opts(10, 0.9, 2));
        assert_eq!(vocab, vec!["spa"]);
    }

    #[test]
    fn test_max_df_boundary_is_inclusive() {
        let d = docs(&["bar spa", "bar"]);
        let (_, vocab) = vectorize(&d, &HashSet::new(), &opts(10, 1.0, 1));
        assert!(vocab.contains(&"bar".to_string()));
    }

    #[test]
    fn test_max_features_keeps_most_frequent_with_alphabetical_ties() {
        let d = docs(&["zoo zoo zoo apt bay cab", "zoo"]);
        // zoo=4, apt=bay=cab=1 -> keep zoo plus alphabetically first tie
        let (_, vocab) = vectorize(&d, &HashSet::new(), &opts(2, 1.0, 1));
        assert_eq!(vocab, vec!["apt", "zoo"]);
    }

    #[test]
    fn test_all_stopwords_gives_empty_vocabulary() {
        let stop: HashSet<String> = ["the".to_string(), "was".to_string(), "were".to_string()].into();
        let (m, vocab) = vectorize(&docs(&["the a an", "is was were"]), &stop, &opts(10, 1.0, 1));
        assert!(vocab.is_empty());
        assert_eq!(m.n_documents(), 2);
        assert_eq!(m.nnz(), 0);
    }
}
