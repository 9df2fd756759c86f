// Review records as they flow through the service.
//
// Loading normalizes every row into a `Review`, so nothing downstream deals
// with missing hotels, unparsed scores or raw sentiment strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Sentiment class of a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SentimentLabel {
    #[serde(alias = "positivo")]
    Positive,
    #[serde(alias = "negativo")]
    Negative,
    #[serde(alias = "neutro")]
    Neutral,
}

/// Compound-score band around zero that counts as neutral.
pub const COMPOUND_NEUTRAL_BAND: f64 = 0.05;
/// Reviewer score at or above which a review counts as positive.
pub const POSITIVE_SCORE: f64 = 7.5;
/// Reviewer score at or below which a review counts as negative.
pub const NEGATIVE_SCORE: f64 = 5.0;

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 3] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Negative => "negative",
            SentimentLabel::Neutral => "neutral",
        }
    }

    /// Classify a lexicon compound score in [-1, 1].
    pub fn from_compound(compound: f64) -> Self {
        if compound >= COMPOUND_NEUTRAL_BAND {
            SentimentLabel::Positive
        } else if compound <= -COMPOUND_NEUTRAL_BAND {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    /// Classify a 0-10 reviewer score.
    pub fn from_score(score: f64) -> Self {
        if score >= POSITIVE_SCORE {
            SentimentLabel::Positive
        } else if score <= NEGATIVE_SCORE {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positive" | "positivo" => Ok(SentimentLabel::Positive),
            "negative" | "negativo" => Ok(SentimentLabel::Negative),
            "neutral" | "neutro" => Ok(SentimentLabel::Neutral),
            other => Err(format!("unknown sentiment label: {other:?}")),
        }
    }
}

/// One normalized hotel review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub hotel: String,
    pub hotel_address: Option<String>,
    pub nationality: String,
    pub positive_review: String,
    pub negative_review: String,
    /// Combined, normalized text used for topics and word clouds.
    pub text: String,
    pub sentiment: SentimentLabel,
    pub compound: Option<f64>,
    pub reviewer_score: f64,
    pub average_score: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}
