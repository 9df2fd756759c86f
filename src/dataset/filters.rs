// Review filtering with offset/limit pagination.

use serde::{Deserialize, Deserializer, Serialize};

use super::models::{Review, SentimentLabel};

/// Row cap applied to review listings that do not ask for a limit.
pub const DEFAULT_LISTING_LIMIT: usize = 10_000;

/// "All" entry of the dashboard's hotel and sentiment selectors.
pub const ALL_HOTELS_OR_SENTIMENTS: &str = "(Todos)";
/// "All" entry of the dashboard's nationality selector.
pub const ALL_NATIONALITIES: &str = "(Todas)";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterParams {
    pub hotel: Option<String>,
    #[serde(deserialize_with = "sentiment_filter")]
    pub sentiment: Option<SentimentLabel>,
    pub nationality: Option<String>,
    pub score_min: f64,
    pub score_max: f64,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            hotel: None,
            sentiment: None,
            nationality: None,
            score_min: 0.0,
            score_max: 10.0,
            offset: 0,
            limit: None,
        }
    }
}

/// Empty strings and the selector's "all" entry leave a criterion unset.
fn set<'a>(value: &'a Option<String>, all: &str) -> Option<&'a str> {
    value.as_deref().filter(|v| !v.is_empty() && *v != all)
}

fn sentiment_filter<'de, D>(deserializer: D) -> Result<Option<SentimentLabel>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        None => Ok(None),
        Some(v) if v.trim().is_empty() || v == ALL_HOTELS_OR_SENTIMENTS => Ok(None),
        Some(v) => v.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

impl FilterParams {
    /// Whether `review` passes the criteria (pagination not considered).
    pub fn matches(&self, review: &Review) -> bool {
        set(&self.hotel, ALL_HOTELS_OR_SENTIMENTS).map_or(true, |h| review.hotel == h)
            && self.sentiment.map_or(true, |s| review.sentiment == s)
            && set(&self.nationality, ALL_NATIONALITIES).map_or(true, |n| review.nationality == n)
            && review.reviewer_score >= self.score_min
            && review.reviewer_score <= self.score_max
    }

    /// Same criteria with pagination stripped; what aggregate endpoints echo.
    pub fn without_pagination(&self) -> Self {
        Self {
            offset: 0,
            limit: None,
            ..self.clone()
        }
    }
}

/// Matching reviews in dataset order, after skipping `offset` and keeping at
/// most `limit` (a zero limit means no limit).
pub fn apply_filters<'a>(reviews: &'a [Review], params: &FilterParams) -> Vec<&'a Review> {
    let matching = reviews
        .iter()
        .filter(|r| params.matches(r))
        .skip(params.offset);
    match params.limit.filter(|&l| l > 0) {
        Some(limit) => matching.take(limit).collect(),
        None => matching.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(hotel: &str, sentiment: SentimentLabel, score: f64) -> Review {
        Review {
            hotel: hotel.to_string(),
            hotel_address: None,
            nationality: "France".to_string(),
            positive_review: String::new(),
            negative_review: String::new(),
            text: format!("{hotel} review"),
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
            review("Ritz", SentimentLabel::Positive, 9.0),
            review("Savoy", SentimentLabel::Negative, 3.0),
            review("Ritz", SentimentLabel::Negative, 4.5),
            review("Ritz", SentimentLabel::Positive, 10.0),
        ]
    }

    #[test]
    fn test_default_matches_everything() {
        assert_eq!(apply_filters(&sample(), &FilterParams::default()).len(), 4);
    }

    #[test]
    fn test_empty_strings_do_not_filter() {
        let params = FilterParams {
            hotel: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(apply_filters(&sample(), &params).len(), 4);
    }

    #[test]
    fn test_selector_all_entries_do_not_filter() {
        let params: FilterParams = serde_json::from_str(
            r#"{"hotel": "(Todos)", "sentiment": "(Todos)", "nationality": "(Todas)"}"#,
        )
        .unwrap();
        assert_eq!(params.sentiment, None);
        assert_eq!(apply_filters(&sample(), &params).len(), 4);
    }

    #[test]
    fn test_unknown_sentiment_is_rejected() {
        assert!(serde_json::from_str::<FilterParams>(r#"{"sentiment": "happy"}"#).is_err());
        let blank: FilterParams = serde_json::from_str(r#"{"sentiment": ""}"#).unwrap();
        assert_eq!(blank.sentiment, None);
    }

    #[test]
    fn test_criteria_combine() {
        let params = FilterParams {
            hotel: Some("Ritz".into()),
            sentiment: Some(SentimentLabel::Positive),
            score_min: 9.5,
            ..Default::default()
        };
        let reviews = sample();
        let found = apply_filters(&reviews, &params);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].reviewer_score, 10.0);
    }

    #[test]
    fn test_score_range_is_inclusive() {
        let params = FilterParams {
            score_min: 3.0,
            score_max: 4.5,
            ..Default::default()
        };
        assert_eq!(apply_filters(&sample(), &params).len(), 2);
    }

    #[test]
    fn test_pagination() {
        let params = FilterParams {
            offset: 1,
            limit: Some(2),
            ..Default::default()
        };
        let reviews = sample();
        let found = apply_filters(&reviews, &params);
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].hotel, "Savoy");

        let past_end = FilterParams {
            offset: 10,
            ..Default::default()
        };
        assert!(apply_filters(&sample(), &past_end).is_empty());
    }

    #[test]
    fn test_deserialize_partial_body() {
        let params: FilterParams = serde_json::from_str(r#"{"sentiment": "negativo"}"#).unwrap();
        assert_eq!(params.sentiment, Some(SentimentLabel::Negative));
        assert_eq!(params.score_max, 10.0);
    }
}
