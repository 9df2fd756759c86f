// Latent Dirichlet Allocation fitted by batch variational Bayes.
//
// Variational parameters:
//   lambda (K x V)  topic-term pseudo-counts; these are the returned weights
//   gamma  (D x K)  per-document topic pseudo-counts
//
// One pass ("iteration") over the corpus:
//   E-step: for every document, iterate gamma to a fixed point against
//           exp(E[log beta]) and accumulate expected sufficient statistics.
//   M-step: lambda = eta + sstats * exp(E[log beta]).
//
// lambda is initialised from Gamma(100, 1/100) and each document's gamma is
// initialised the same way, all drawn from one RNG seeded by the caller, so a
// given seed and input always yield the same model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Gamma;
use tracing::{debug, error};

use super::cancel::CancelFlag;
use super::error::TopicError;
use super::vectorizer::DocTermMatrix;

const INIT_SHAPE: f64 = 100.0;
const INIT_SCALE: f64 = 0.01;

/// Optimizer settings. Priors default to `1 / n_topics` when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct LdaOptions {
    pub n_topics: usize,
    pub max_iter: usize,
    pub random_seed: u64,
    pub doc_topic_prior: Option<f64>,
    pub topic_word_prior: Option<f64>,
    /// Cap on gamma fixed-point updates per document per E-step.
    pub max_doc_update_iter: usize,
    /// Mean absolute gamma change below which a document's E-step stops.
    pub mean_change_tol: f64,
    /// Mean absolute lambda change below which the whole fit stops early.
    /// `None` always runs `max_iter` passes.
    pub convergence_tol: Option<f64>,
}

impl LdaOptions {
    pub fn new(n_topics: usize, max_iter: usize, random_seed: u64) -> Self {
        Self {
            n_topics,
            max_iter,
            random_seed,
            doc_topic_prior: None,
            topic_word_prior: None,
            max_doc_update_iter: 100,
            mean_change_tol: 1e-3,
            convergence_tol: None,
        }
    }
}

/// A fitted model. Lives only as long as the request that produced it.
#[derive(Debug, Clone)]
pub struct LdaModel {
    /// Unnormalised topic-term weights, one row per topic.
    pub components: Vec<Vec<f64>>,
    /// Passes actually run (less than `max_iter` only on early convergence).
    pub n_iter: usize,
    doc_topic_prior: f64,
    max_doc_update_iter: usize,
    mean_change_tol: f64,
}

/// Digamma function. Recurrence up to x >= 6, then the asymptotic series.
pub fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let f = 1.0 / (x * x);
    result + x.ln()
        - 0.5 / x
        - f * (1.0 / 12.0 - f * (1.0 / 120.0 - f * (1.0 / 252.0 - f * (1.0 / 240.0 - f / 132.0))))
}

/// exp(E[log theta]) for a Dirichlet with parameter `alpha`.
fn exp_dirichlet_expectation(alpha: &[f64]) -> Vec<f64> {
    let psi_total = digamma(alpha.iter().sum());
    alpha.iter().map(|&a| (digamma(a) - psi_total).exp()).collect()
}

fn mean_abs_change(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum::<f64>() / a.len().max(1) as f64
}

/// Fit LDA over `matrix`.
///
/// The cancel flag is checked before every pass. Fails with
/// `EmptyVocabulary` on a zero-width matrix and `InvalidInput` on zero rows or
/// zero topics.
pub fn fit(
    matrix: &DocTermMatrix,
    options: &LdaOptions,
    cancel: &CancelFlag,
) -> Result<LdaModel, TopicError> {
    let n_docs = matrix.n_documents();
    let n_terms = matrix.n_terms();
    let k = options.n_topics;

    if n_terms == 0 {
        return Err(TopicError::EmptyVocabulary { documents: n_docs });
    }
    if n_docs == 0 {
        return Err(TopicError::InvalidInput(
            "cannot fit a topic model over zero documents".to_string(),
        ));
    }
    if k == 0 || options.max_iter == 0 {
        return Err(TopicError::InvalidInput(
            "n_topics and max_iter must be at least 1".to_string(),
        ));
    }

    let fit_failure = |reason: String| {
        error!(documents = n_docs, vocabulary = n_terms, %reason, "LDA fit failed");
        TopicError::FitFailure {
            documents: n_docs,
            vocabulary: n_terms,
            reason,
        }
    };

    let alpha = options.doc_topic_prior.unwrap_or(1.0 / k as f64);
    let eta = options.topic_word_prior.unwrap_or(1.0 / k as f64);
    if !(alpha > 0.0 && eta > 0.0) {
        return Err(TopicError::InvalidInput(
            "Dirichlet priors must be positive".to_string(),
        ));
    }

    let init = Gamma::new(INIT_SHAPE, INIT_SCALE).map_err(|e| fit_failure(e.to_string()))?;
    let mut rng = StdRng::seed_from_u64(options.random_seed);

    let mut lambda: Vec<Vec<f64>> = (0..k)
        .map(|_| (0..n_terms).map(|_| rng.sample(&init)).collect())
        .collect();
    let mut exp_elog_beta: Vec<Vec<f64>> = lambda.iter().map(|r| exp_dirichlet_expectation(r)).collect();

    let mut n_iter = 0;
    for iteration in 0..options.max_iter {
        if cancel.is_cancelled() {
            return Err(TopicError::Cancelled {
                completed: iteration,
                max_iter: options.max_iter,
            });
        }

        let mut sstats = vec![vec![0.0; n_terms]; k];
        for doc in 0..n_docs {
            let gamma: Vec<f64> = (0..k).map(|_| rng.sample(&init)).collect();
            let (ids, cnts) = matrix.row(doc);
            if ids.is_empty() {
                continue;
            }
            let inferred = infer_document(
                ids,
                cnts,
                gamma,
                &exp_elog_beta,
                alpha,
                options.max_doc_update_iter,
                options.mean_change_tol,
            );
            for (t, stats_row) in sstats.iter_mut().enumerate() {
                for (j, &id) in ids.iter().enumerate() {
                    stats_row[id] +=
                        inferred.exp_elog_theta[t] * f64::from(cnts[j]) / inferred.norm_phi[j];
                }
            }
        }

        let mut change = 0.0;
        for t in 0..k {
            let mut new_row = Vec::with_capacity(n_terms);
            for w in 0..n_terms {
                new_row.push(eta + sstats[t][w] * exp_elog_beta[t][w]);
            }
            if new_row.iter().any(|v| !v.is_finite()) {
                return Err(fit_failure(format!(
                    "non-finite topic weight in topic {t} at iteration {}",
                    iteration + 1
                )));
            }
            change += mean_abs_change(&new_row, &lambda[t]);
            lambda[t] = new_row;
            exp_elog_beta[t] = exp_dirichlet_expectation(&lambda[t]);
        }
        change /= k as f64;
        n_iter = iteration + 1;
        debug!(iteration = n_iter, mean_change = change, "LDA pass complete");

        if options.convergence_tol.is_some_and(|tol| change < tol) {
            debug!(iteration = n_iter, "LDA converged");
            break;
        }
    }

    Ok(LdaModel {
        components: lambda,
        n_iter,
        doc_topic_prior: alpha,
        max_doc_update_iter: options.max_doc_update_iter,
        mean_change_tol: options.mean_change_tol,
    })
}

struct DocumentInference {
    gamma: Vec<f64>,
    exp_elog_theta: Vec<f64>,
    /// Per-token normaliser under the final theta, for sufficient statistics.
    norm_phi: Vec<f64>,
}

/// Run the per-document gamma fixed point.
fn infer_document(
    ids: &[usize],
    cnts: &[u32],
    mut gamma: Vec<f64>,
    exp_elog_beta: &[Vec<f64>],
    alpha: f64,
    max_updates: usize,
    tol: f64,
) -> DocumentInference {
    let k = gamma.len();
    let mut exp_elog_theta = exp_dirichlet_expectation(&gamma);
    let phi_norm = |theta: &[f64]| -> Vec<f64> {
        ids.iter()
            .map(|&id| {
                (0..k).map(|t| theta[t] * exp_elog_beta[t][id]).sum::<f64>() + f64::EPSILON
            })
            .collect()
    };

    for _ in 0..max_updates {
        let norm_phi = phi_norm(&exp_elog_theta);
        let last = gamma.clone();
        for t in 0..k {
            let dot: f64 = ids
                .iter()
                .zip(cnts)
                .zip(&norm_phi)
                .map(|((&id, &c), &n)| f64::from(c) / n * exp_elog_beta[t][id])
                .sum();
            gamma[t] = alpha + exp_elog_theta[t] * dot;
        }
        exp_elog_theta = exp_dirichlet_expectation(&gamma);
        if mean_abs_change(&last, &gamma) < tol {
            break;
        }
    }

    let norm_phi = phi_norm(&exp_elog_theta);
    DocumentInference {
        gamma,
        exp_elog_theta,
        norm_phi,
    }
}

impl LdaModel {
    pub fn n_topics(&self) -> usize {
        self.components.len()
    }

    pub fn n_terms(&self) -> usize {
        self.components.first().map_or(0, Vec::len)
    }

    /// Document-topic distribution for `matrix` under the fitted topics.
    /// Each row sums to 1; documents with no vocabulary terms get the uniform
    /// distribution.
    pub fn transform(&self, matrix: &DocTermMatrix) -> Result<Vec<Vec<f64>>, TopicError> {
        if matrix.n_terms() != self.n_terms() {
            return Err(TopicError::ShapeMismatch {
                expected: self.n_terms(),
                found: matrix.n_terms(),
            });
        }
        let k = self.n_topics();
        let exp_elog_beta: Vec<Vec<f64>> = self
            .components
            .iter()
            .map(|r| exp_dirichlet_expectation(r))
            .collect();

        let rows = (0..matrix.n_documents())
            .map(|doc| {
                let (ids, cnts) = matrix.row(doc);
                if ids.is_empty() {
                    return vec![1.0 / k as f64; k];
                }
                let gamma = infer_document(
                    ids,
                    cnts,
                    vec![1.0; k],
                    &exp_elog_beta,
                    self.doc_topic_prior,
                    self.max_doc_update_iter,
                    self.mean_change_tol,
                )
                .gamma;
                let total: f64 = gamma.iter().sum();
                gamma.into_iter().map(|g| g / total).collect()
            })
            .collect();
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cluster_matrix() -> DocTermMatrix {
        // terms 0-2 co-occur, terms 3-5 co-occur
        DocTermMatrix::from_rows(
            6,
            vec![
                vec![(0, 3), (1, 2), (2, 2)],
                vec![(0, 2), (1, 3), (2, 1)],
                vec![(0, 1), (1, 2), (2, 3)],
                vec![(3, 3), (4, 2), (5, 2)],
                vec![(3, 2), (4, 3), (5, 1)],
                vec![(3, 1), (4, 2), (5, 3)],
            ],
        )
    }

    #[test]
    fn test_digamma_known_values() {
        assert!((digamma(1.0) + 0.577_215_664_9).abs() < 1e-8);
        assert!((digamma(0.5) + 1.963_510_026_0).abs() < 1e-8);
        assert!((digamma(10.0) - 2.251_752_589_1).abs() < 1e-8);
    }

    #[test]
    fn test_fit_shapes_and_non_negative() {
        let m = two_cluster_matrix();
        let model = fit(&m, &LdaOptions::new(2, 10, 42), &CancelFlag::new()).unwrap();
        assert_eq!(model.n_topics(), 2);
        assert_eq!(model.n_terms(), 6);
        assert_eq!(model.n_iter, 10);
        assert!(model.components.iter().flatten().all(|&w| w > 0.0 && w.is_finite()));
    }

    #[test]
    fn test_fit_is_deterministic_for_seed() {
        let m = two_cluster_matrix();
        let a = fit(&m, &LdaOptions::new(3, 5, 7), &CancelFlag::new()).unwrap();
        let b = fit(&m, &LdaOptions::new(3, 5, 7), &CancelFlag::new()).unwrap();
        assert_eq!(a.components, b.components);
    }

    #[test]
    fn test_separates_clusters() {
        let m = two_cluster_matrix();
        let model = fit(&m, &LdaOptions::new(2, 30, 42), &CancelFlag::new()).unwrap();
        let dist = model.transform(&m).unwrap();
        let dominant: Vec<usize> = dist
            .iter()
            .map(|row| if row[0] >= row[1] { 0 } else { 1 })
            .collect();
        assert_eq!(dominant[0], dominant[1]);
        assert_eq!(dominant[1], dominant[2]);
        assert_eq!(dominant[3], dominant[4]);
        assert_eq!(dominant[4], dominant[5]);
        assert_ne!(dominant[0], dominant[3]);
    }

    #[test]
    fn test_transform_rows_sum_to_one() {
        let m = two_cluster_matrix();
        let model = fit(&m, &LdaOptions::new(4, 3, 1), &CancelFlag::new()).unwrap();
        let with_empty = DocTermMatrix::from_rows(6, vec![vec![(0, 1)], vec![]]);
        for row in model.transform(&with_empty).unwrap() {
            assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_empty_vocabulary_fails_fast() {
        let m = DocTermMatrix::from_rows(0, vec![vec![], vec![]]);
        let err = fit(&m, &LdaOptions::new(2, 5, 42), &CancelFlag::new()).unwrap_err();
        assert!(matches!(err, TopicError::EmptyVocabulary { documents: 2 }));
    }

    #[test]
    fn test_cancelled_before_first_pass() {
        let cancel = CancelFlag::new();
        cancel.cancel();
        let err = fit(&two_cluster_matrix(), &LdaOptions::new(2, 5, 42), &cancel).unwrap_err();
        assert!(matches!(
            err,
            TopicError::Cancelled {
                completed: 0,
                max_iter: 5
            }
        ));
    }

    #[test]
    fn test_convergence_tolerance_stops_early() {
        let mut opts = LdaOptions::new(2, 500, 42);
        opts.convergence_tol = Some(1e-2);
        let model = fit(&two_cluster_matrix(), &opts, &CancelFlag::new()).unwrap();
        assert!(model.n_iter < 500);
    }

    #[test]
    fn test_more_topics_than_documents_is_allowed() {
        let m = DocTermMatrix::from_rows(3, vec![vec![(0, 1), (1, 1)], vec![(2, 2)]]);
        let model = fit(&m, &LdaOptions::new(5, 3, 42), &CancelFlag::new()).unwrap();
        assert_eq!(model.n_topics(), 5);
    }
}
