// CSV loading and schema normalization.
//
// Every column is optional. Numeric cells that fail to parse become missing
// rather than failing the whole load, since the processed dataset has a
// handful of malformed rows.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use super::models::{Review, SentimentLabel};
use super::stats::median;
use crate::topics::normalize::{compose_review, normalize};

pub const UNKNOWN_HOTEL: &str = "Unknown Hotel";
pub const UNSPECIFIED_NATIONALITY: &str = "Unspecified";

#[derive(Debug, Deserialize)]
struct RawReview {
    #[serde(rename = "Hotel_Name", default)]
    hotel_name: Option<String>,
    #[serde(rename = "Hotel_Address", default)]
    hotel_address: Option<String>,
    #[serde(rename = "Reviewer_Nationality", default)]
    nationality: Option<String>,
    #[serde(rename = "Positive_Review", default)]
    positive_review: Option<String>,
    #[serde(rename = "Negative_Review", default)]
    negative_review: Option<String>,
    #[serde(rename = "review_text", default)]
    review_text: Option<String>,
    #[serde(rename = "sentiment_label", default)]
    sentiment_label: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    compound: Option<f64>,
    #[serde(rename = "Reviewer_Score", default, deserialize_with = "csv::invalid_option")]
    reviewer_score: Option<f64>,
    #[serde(rename = "Average_Score", default, deserialize_with = "csv::invalid_option")]
    average_score: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    lng: Option<f64>,
}

/// Load and normalize the processed reviews CSV at `path`.
pub fn load_reviews(path: &Path) -> Result<Vec<Review>> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("failed to open reviews dataset at {}", path.display()))?;
    let reviews = read_reviews(file)
        .with_context(|| format!("failed to parse reviews dataset at {}", path.display()))?;
    info!(
        path = %path.display(),
        reviews = reviews.len(),
        "Loaded reviews dataset"
    );
    Ok(reviews)
}

/// Parse reviews from any CSV source with a header row.
pub fn read_reviews<R: Read>(source: R) -> Result<Vec<Review>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(source);
    let mut raw = Vec::new();
    for (line, record) in reader.deserialize::<RawReview>().enumerate() {
        // header is line 1
        raw.push(record.with_context(|| format!("malformed CSV record at line {}", line + 2))?);
    }
    Ok(normalize_rows(raw))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_rows(raw: Vec<RawReview>) -> Vec<Review> {
    let mut present: Vec<f64> = raw.iter().filter_map(|r| r.reviewer_score).collect();
    let fallback_score = median(&mut present).unwrap_or(0.0);

    raw.into_iter()
        .map(|row| {
            let text = match non_empty(row.review_text) {
                Some(text) => normalize(Some(&text)),
                None => compose_review(
                    row.positive_review.as_deref(),
                    row.negative_review.as_deref(),
                ),
            };

            let sentiment = row
                .sentiment_label
                .as_deref()
                .and_then(|label| label.parse::<SentimentLabel>().ok())
                .or_else(|| row.compound.map(SentimentLabel::from_compound))
                .or_else(|| row.reviewer_score.map(SentimentLabel::from_score))
                .unwrap_or(SentimentLabel::Neutral);

            Review {
                hotel: non_empty(row.hotel_name).unwrap_or_else(|| UNKNOWN_HOTEL.to_string()),
                hotel_address: non_empty(row.hotel_address),
                nationality: non_empty(row.nationality)
                    .unwrap_or_else(|| UNSPECIFIED_NATIONALITY.to_string()),
                positive_review: normalize(row.positive_review.as_deref()),
                negative_review: normalize(row.negative_review.as_deref()),
                text,
                sentiment,
                compound: row.compound,
                reviewer_score: row.reviewer_score.unwrap_or(fallback_score),
                average_score: row.average_score,
                lat: row.lat,
                lng: row.lng,
            }
        })
        .collect()
}
