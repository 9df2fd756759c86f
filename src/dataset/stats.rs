// Dataset statistics, aggregated metrics, distributions and word-cloud
// frequencies. Everything here is a pure function of a slice of reviews.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::filters::FilterParams;
use super::models::{Review, SentimentLabel};
use crate::topics::normalize::normalize_str;

/// Upper bounds of the reviewer-score histogram bins; each bin is (prev, upper].
const SCORE_BIN_EDGES: [f64; 6] = [0.0, 2.0, 4.0, 6.0, 8.0, 10.0];
const TOP_GROUPS: usize = 10;
const DISTRIBUTION_GROUPS: usize = 20;
/// Cap on combined word-cloud text, in characters.
pub const WORD_CLOUD_MAX_CHARS: usize = 500_000;

/// Median of `values`, reordering the slice. `None` when empty.
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    Some(if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    })
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        round2(count as f64 / total as f64 * 100.0)
    }
}

/// Count occurrences and order by descending count, ties by key.
fn value_counts<'a, I>(items: I) -> Vec<(String, usize)>
where
    I: Iterator<Item = &'a str>,
{
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let mut sorted: Vec<(String, usize)> =
        counts.into_iter().map(|(k, v)| (k.to_string(), v)).collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    sorted
}

fn sentiment_counts(reviews: &[&Review]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for review in reviews {
        *counts.entry(review.sentiment.to_string()).or_insert(0) += 1;
    }
    counts
}

/// Exact label for a reviewer score: shortest round-trip digits, with whole
/// numbers keeping one decimal ("9.0", "8.75"). Rounding here would merge
/// distinct scores such as median fills.
fn score_key(score: f64) -> String {
    if score.fract() == 0.0 {
        format!("{score:.1}")
    } else {
        format!("{score}")
    }
}

/// Reviewer-score value counts in ascending score order.
fn score_counts(reviews: &[&Review]) -> Vec<(f64, usize)> {
    let mut scores: Vec<f64> = reviews.iter().map(|r| r.reviewer_score).collect();
    scores.sort_by(f64::total_cmp);
    let mut counts: Vec<(f64, usize)> = Vec::new();
    for score in scores {
        match counts.last_mut() {
            Some((last, n)) if *last == score => *n += 1,
            _ => counts.push((score, 1)),
        }
    }
    counts
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub total_reviews: usize,
    pub total_hotels: usize,
    pub total_countries: usize,
    pub average_score: f64,
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub score_distribution: BTreeMap<String, usize>,
}

/// Whole-dataset summary. Scores outside (0, 10] fall in no bin.
pub fn dataset_stats(reviews: &[Review]) -> DatasetStats {
    let refs: Vec<&Review> = reviews.iter().collect();

    let mut score_distribution: BTreeMap<String, usize> = SCORE_BIN_EDGES
        .windows(2)
        .map(|w| (format!("({}, {}]", w[0], w[1]), 0))
        .collect();
    for review in reviews {
        let bin = SCORE_BIN_EDGES
            .windows(2)
            .find(|w| review.reviewer_score > w[0] && review.reviewer_score <= w[1]);
        if let Some(w) = bin {
            if let Some(count) = score_distribution.get_mut(&format!("({}, {}]", w[0], w[1])) {
                *count += 1;
            }
        }
    }

    DatasetStats {
        total_reviews: reviews.len(),
        total_hotels: distinct_hotels(reviews).len(),
        total_countries: distinct_nationalities(reviews).len(),
        average_score: mean(reviews.iter().map(|r| r.reviewer_score)),
        sentiment_distribution: sentiment_counts(&refs),
        score_distribution,
    }
}

/// Sorted distinct hotel names.
pub fn distinct_hotels(reviews: &[Review]) -> Vec<String> {
    let set: BTreeSet<&str> = reviews.iter().map(|r| r.hotel.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

/// Sorted distinct reviewer nationalities.
pub fn distinct_nationalities(reviews: &[Review]) -> Vec<String> {
    let set: BTreeSet<&str> = reviews.iter().map(|r| r.nationality.as_str()).collect();
    set.into_iter().map(str::to_string).collect()
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HotelSummary {
    pub hotel: String,
    pub review_count: usize,
    pub avg_score: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NationalitySummary {
    pub nationality: String,
    pub review_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AggregatedMetrics {
    pub total_reviews: usize,
    pub filters_applied: FilterParams,
    pub sentiment_distribution: BTreeMap<String, usize>,
    pub sentiment_percentages: BTreeMap<String, f64>,
    pub score_distribution: BTreeMap<String, usize>,
    pub average_score: f64,
    pub median_score: f64,
    pub top_hotels: Vec<HotelSummary>,
    pub top_nationalities: Vec<NationalitySummary>,
}

/// Metrics over an already filtered subset. `filters` is echoed back without
/// its pagination fields.
pub fn aggregated_metrics(reviews: &[&Review], filters: &FilterParams) -> AggregatedMetrics {
    let total = reviews.len();
    let sentiment_distribution = sentiment_counts(reviews);
    let sentiment_percentages = sentiment_distribution
        .iter()
        .map(|(k, &v)| (k.clone(), percent(v, total)))
        .collect();

    let mut scores: Vec<f64> = reviews.iter().map(|r| r.reviewer_score).collect();

    let mut by_hotel: HashMap<&str, (usize, f64)> = HashMap::new();
    for review in reviews {
        let entry = by_hotel.entry(review.hotel.as_str()).or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += review.reviewer_score;
    }
    let mut top_hotels: Vec<HotelSummary> = by_hotel
        .into_iter()
        .map(|(hotel, (count, sum))| HotelSummary {
            hotel: hotel.to_string(),
            review_count: count,
            avg_score: round2(sum / count as f64),
        })
        .collect();
    top_hotels.sort_by(|a, b| {
        b.review_count
            .cmp(&a.review_count)
            .then_with(|| a.hotel.cmp(&b.hotel))
    });
    top_hotels.truncate(TOP_GROUPS);

    let top_nationalities = value_counts(reviews.iter().map(|r| r.nationality.as_str()))
        .into_iter()
        .take(TOP_GROUPS)
        .map(|(nationality, review_count)| NationalitySummary {
            nationality,
            review_count,
        })
        .collect();

    AggregatedMetrics {
        total_reviews: total,
        filters_applied: filters.without_pagination(),
        sentiment_distribution,
        sentiment_percentages,
        score_distribution: score_counts(reviews)
            .into_iter()
            .map(|(s, n)| (score_key(s), n))
            .collect(),
        average_score: round2(mean(scores.iter().copied())),
        median_score: round2(median(&mut scores).unwrap_or(0.0)),
        top_hotels,
        top_nationalities,
    }
}

/// Which field a distribution is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DistributionMetric {
    Sentiment,
    Score,
    Hotel,
    Nationality,
}

impl DistributionMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            DistributionMetric::Sentiment => "sentiment",
            DistributionMetric::Score => "score",
            DistributionMetric::Hotel => "hotel",
            DistributionMetric::Nationality => "nationality",
        }
    }
}

impl FromStr for DistributionMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sentiment" => Ok(DistributionMetric::Sentiment),
            "score" => Ok(DistributionMetric::Score),
            "hotel" => Ok(DistributionMetric::Hotel),
            "nationality" => Ok(DistributionMetric::Nationality),
            other => Err(format!(
                "invalid metric {other:?}; expected sentiment, score, hotel or nationality"
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Distribution {
    pub labels: Vec<String>,
    pub values: Vec<usize>,
    pub percentages: Vec<f64>,
    pub metric: String,
}

/// Counts per label. Scores are in ascending score order; every other metric
/// is by descending count, with hotels and nationalities capped at 20 labels.
pub fn distribution(reviews: &[&Review], metric: DistributionMetric) -> Distribution {
    let counts: Vec<(String, usize)> = match metric {
        DistributionMetric::Sentiment => {
            value_counts(reviews.iter().map(|r| r.sentiment.as_str()))
        }
        DistributionMetric::Score => score_counts(reviews)
            .into_iter()
            .map(|(s, n)| (score_key(s), n))
            .collect(),
        DistributionMetric::Hotel => value_counts(reviews.iter().map(|r| r.hotel.as_str()))
            .into_iter()
            .take(DISTRIBUTION_GROUPS)
            .collect(),
        DistributionMetric::Nationality => {
            value_counts(reviews.iter().map(|r| r.nationality.as_str()))
                .into_iter()
                .take(DISTRIBUTION_GROUPS)
                .collect()
        }
    };

    let total = reviews.len();
    Distribution {
        percentages: counts.iter().map(|(_, n)| percent(*n, total)).collect(),
        values: counts.iter().map(|(_, n)| *n).collect(),
        labels: counts.into_iter().map(|(l, _)| l).collect(),
        metric: metric.as_str().to_string(),
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WordCloud {
    pub words: BTreeMap<String, usize>,
    /// Distinct words before stopword filtering.
    pub total_words: usize,
}

/// Pick up to `sample_size` reviews with a seeded RNG, preserving their
/// relative order. Returns everything when the subset is already small enough.
pub fn seeded_sample<'a>(reviews: &[&'a Review], sample_size: usize, seed: u64) -> Vec<&'a Review> {
    if reviews.len() <= sample_size {
        return reviews.to_vec();
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let mut picked = rand::seq::index::sample(&mut rng, reviews.len(), sample_size).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| reviews[i]).collect()
}

/// Word frequencies for a word cloud.
///
/// Text of the sampled reviews is joined, capped at [`WORD_CLOUD_MAX_CHARS`],
/// normalized and lowercased. Stopwords and words of two characters or fewer
/// are dropped; the `max_words` most frequent remain (ties alphabetical).
pub fn word_cloud(
    reviews: &[&Review],
    stopwords: &HashSet<String>,
    max_words: usize,
    sample_size: usize,
    seed: u64,
) -> WordCloud {
    let sampled = seeded_sample(reviews, sample_size, seed);
    let mut joined = sampled
        .iter()
        .map(|r| r.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    if let Some((cut, _)) = joined.char_indices().nth(WORD_CLOUD_MAX_CHARS) {
        joined.truncate(cut);
    }

    let cleaned = normalize_str(&joined).to_lowercase();
    let mut frequencies: HashMap<&str, usize> = HashMap::new();
    for word in cleaned.split_whitespace() {
        *frequencies.entry(word).or_insert(0) += 1;
    }
    let total_words = frequencies.len();

    let mut kept: Vec<(&str, usize)> = frequencies
        .into_iter()
        .filter(|(w, _)| w.chars().count() > 2 && !stopwords.contains(*w))
        .collect();
    kept.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    kept.truncate(max_words);

    WordCloud {
        words: kept.into_iter().map(|(w, n)| (w.to_string(), n)).collect(),
        total_words,
    }
}

/// Count reviews per sentiment, in declaration order, including zeros.
pub fn sentiment_totals(reviews: &[Review]) -> Vec<(SentimentLabel, usize)> {
    SentimentLabel::ALL
        .iter()
        .map(|&label| (label, reviews.iter().filter(|r| r.sentiment == label).count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(hotel: &str, nationality: &str, sentiment: SentimentLabel, score: f64, text: &str) -> Review {
        Review {
            hotel: hotel.to_string(),
            hotel_address: None,
            nationality: nationality.to_string(),
            positive_review: String::new(),
            negative_review: String::new(),
            text: text.to_string(),
            sentiment,
            compound: None,
            reviewer_score: score,
            average_score: None,
            lat: None,
            lng: None,
        }
    }

    fn sample() -> Vec<Review> {
        vec![
            review("Ritz", "France", SentimentLabel::Positive, 9.0, "Breakfast was superb"),
            review("Savoy", "Spain", SentimentLabel::Negative, 3.0, "Noisy street, noisy room"),
            review("Ritz", "France", SentimentLabel::Negative, 4.0, "Tiny breakfast"),
            review("Ritz", "Italy", SentimentLabel::Neutral, 7.0, "Breakfast ok"),
        ]
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&mut []), None);
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn test_dataset_stats_bins() {
        let stats = dataset_stats(&sample());
        assert_eq!(stats.total_reviews, 4);
        assert_eq!(stats.total_hotels, 2);
        assert_eq!(stats.total_countries, 3);
        assert_eq!(stats.average_score, 5.75);
        assert_eq!(stats.score_distribution["(2, 4]"], 2);
        assert_eq!(stats.score_distribution["(6, 8]"], 1);
        assert_eq!(stats.score_distribution["(8, 10]"], 1);
        assert_eq!(stats.score_distribution["(0, 2]"], 0);
        assert_eq!(stats.sentiment_distribution["negative"], 2);
    }

    #[test]
    fn test_aggregated_metrics() {
        let reviews = sample();
        let refs: Vec<&Review> = reviews.iter().collect();
        let filters = FilterParams {
            offset: 5,
            limit: Some(3),
            ..Default::default()
        };
        let metrics = aggregated_metrics(&refs, &filters);
        assert_eq!(metrics.total_reviews, 4);
        assert_eq!(metrics.filters_applied.offset, 0);
        assert_eq!(metrics.filters_applied.limit, None);
        assert_eq!(metrics.sentiment_percentages["negative"], 50.0);
        assert_eq!(metrics.median_score, 5.5);
        assert_eq!(metrics.top_hotels[0].hotel, "Ritz");
        assert_eq!(metrics.top_hotels[0].review_count, 3);
        assert_eq!(metrics.top_hotels[0].avg_score, 6.67);
        assert_eq!(metrics.top_nationalities[0].nationality, "France");
        assert_eq!(metrics.score_distribution["9.0"], 1);
    }

    #[test]
    fn test_distribution_orders() {
        let reviews = sample();
        let refs: Vec<&Review> = reviews.iter().collect();

        let hotels = distribution(&refs, DistributionMetric::Hotel);
        assert_eq!(hotels.labels, vec!["Ritz", "Savoy"]);
        assert_eq!(hotels.values, vec![3, 1]);
        assert_eq!(hotels.percentages, vec![75.0, 25.0]);

        let scores = distribution(&refs, DistributionMetric::Score);
        assert_eq!(scores.labels, vec!["3.0", "4.0", "7.0", "9.0"]);
        assert_eq!(scores.metric, "score");
    }

    #[test]
    fn test_score_counts_keep_every_distinct_score() {
        let reviews = vec![
            review("Ritz", "France", SentimentLabel::Positive, 8.7, "Lovely"),
            review("Ritz", "France", SentimentLabel::Positive, 8.8, "Lovely"),
            review("Ritz", "France", SentimentLabel::Positive, 8.75, "Lovely"),
        ];
        let refs: Vec<&Review> = reviews.iter().collect();

        let metrics = aggregated_metrics(&refs, &FilterParams::default());
        assert_eq!(metrics.score_distribution.len(), 3);
        assert_eq!(metrics.score_distribution["8.75"], 1);
        assert_eq!(
            metrics.score_distribution.values().sum::<usize>(),
            metrics.total_reviews
        );

        let scores = distribution(&refs, DistributionMetric::Score);
        assert_eq!(scores.labels, vec!["8.7", "8.75", "8.8"]);
        assert_eq!(scores.values.iter().sum::<usize>(), reviews.len());
    }

    #[test]
    fn test_metric_parse() {
        assert_eq!("hotel".parse(), Ok(DistributionMetric::Hotel));
        assert!("country".parse::<DistributionMetric>().is_err());
    }

    #[test]
    fn test_word_cloud() {
        let reviews = sample();
        let refs: Vec<&Review> = reviews.iter().collect();
        let stopwords: HashSet<String> = ["was".to_string()].into();
        let cloud = word_cloud(&refs, &stopwords, 2, 100, 42);
        assert_eq!(cloud.words.len(), 2);
        assert_eq!(cloud.words["breakfast"], 3);
        assert_eq!(cloud.words["noisy"], 2);
        assert!(cloud.total_words > cloud.words.len());
        assert!(!cloud.words.contains_key("ok"));
    }

    #[test]
    fn test_seeded_sample_is_deterministic() {
        let reviews: Vec<Review> = (0..50)
            .map(|i| review("H", "N", SentimentLabel::Neutral, 5.0, &format!("text {i}")))
            .collect();
        let refs: Vec<&Review> = reviews.iter().collect();
        let a = seeded_sample(&refs, 10, 42);
        let b = seeded_sample(&refs, 10, 42);
        assert_eq!(a.len(), 10);
        assert_eq!(a, b);
    }
}
