// Dataset layer tests: CSV loading from disk, the TTL-cached repository,
// filtering and the statistics built on top of it.

use std::io::Write;
use std::time::Duration;

use stayscope::dataset::loader::{load_reviews, UNKNOWN_HOTEL, UNSPECIFIED_NATIONALITY};
use stayscope::dataset::stats::{
    aggregated_metrics, dataset_stats, distinct_hotels, distinct_nationalities, word_cloud,
};
use stayscope::dataset::{apply_filters, FilterParams, ReviewRepository, SentimentLabel};
use stayscope::topics::stopwords::build_stopwords;
use tempfile::NamedTempFile;

const CSV: &str = "\
Hotel_Name,Hotel_Address,Reviewer_Nationality,Positive_Review,Negative_Review,review_text,sentiment_label,compound,Reviewer_Score,Average_Score,lat,lng
Ritz,150 Piccadilly,United Kingdom,Breakfast was superb,No Negative,,positive,0.9,9.6,8.9,51.507,-0.141
Ritz,150 Piccadilly,France,No Positive,Noisy street outside,,,-0.6,4.2,8.9,51.507,-0.141
Savoy,Strand,Germany,Spotless bathroom,Pricey minibar,,,,7.9,9.1,51.510,-0.120
Savoy,Strand,United Kingdom,,,Breakfast buffet and spotless bathroom,negative,,not-a-number,9.1,,
,,,Friendly doorman,,,,,2.0,,,
";

fn csv_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

// ============================================================
// Loading
// ============================================================

#[test]
fn load_reviews_normalizes_every_row() {
    let file = csv_file(CSV);
    let reviews = load_reviews(file.path()).unwrap();
    assert_eq!(reviews.len(), 5);

    assert_eq!(reviews[0].text, "Breakfast was superb");
    assert_eq!(reviews[0].sentiment, SentimentLabel::Positive);
    assert_eq!(reviews[0].lat, Some(51.507));

    // compound decides when no label is given
    assert_eq!(reviews[1].text, "Noisy street outside");
    assert_eq!(reviews[1].sentiment, SentimentLabel::Negative);

    // reviewer score decides when neither label nor compound is present
    assert_eq!(reviews[2].text, "Spotless bathroom. Pricey minibar");
    assert_eq!(reviews[2].sentiment, SentimentLabel::Positive);

    // precomputed text wins over the halves; bad score takes the median
    assert_eq!(reviews[3].text, "Breakfast buffet and spotless bathroom");
    assert_eq!(reviews[3].sentiment, SentimentLabel::Negative);
    assert!((reviews[3].reviewer_score - 6.05).abs() < 1e-9);
    assert_eq!(reviews[3].lat, None);

    assert_eq!(reviews[4].hotel, UNKNOWN_HOTEL);
    assert_eq!(reviews[4].nationality, UNSPECIFIED_NATIONALITY);
    assert_eq!(reviews[4].sentiment, SentimentLabel::Negative);
}

#[test]
fn load_reviews_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.csv");
    let err = load_reviews(&path).unwrap_err();
    assert!(format!("{err:#}").contains("failed to open reviews dataset"));
}

#[test]
fn header_only_file_is_an_empty_dataset() {
    let file = csv_file("Hotel_Name,Reviewer_Score\n");
    assert!(load_reviews(file.path()).unwrap().is_empty());
}

// ============================================================
// Repository
// ============================================================

#[tokio::test]
async fn repository_serves_cached_copy_until_file_is_reloaded() {
    let file = csv_file(CSV);
    let repo = ReviewRepository::from_csv(file.path().to_path_buf(), Duration::from_secs(3600));
    assert!(repo.age().await.is_none());

    let first = repo.get().await.unwrap();
    assert_eq!(first.len(), 5);
    assert!(repo.age().await.is_some());

    // rewriting the file does not matter inside the TTL
    std::fs::write(file.path(), "Hotel_Name,Reviewer_Score\nSolo,8.0\n").unwrap();
    let second = repo.get().await.unwrap();
    assert_eq!(second.len(), 5);
}

#[tokio::test]
async fn repository_with_zero_ttl_reloads_every_time() {
    let file = csv_file(CSV);
    let repo = ReviewRepository::from_csv(file.path().to_path_buf(), Duration::ZERO);
    assert_eq!(repo.get().await.unwrap().len(), 5);

    std::fs::write(file.path(), "Hotel_Name,Reviewer_Score\nSolo,8.0\n").unwrap();
    let reloaded = repo.get().await.unwrap();
    assert_eq!(reloaded.len(), 1);
    assert_eq!(reloaded[0].hotel, "Solo");
}

#[tokio::test]
async fn repository_surfaces_load_failure() {
    let dir = tempfile::tempdir().unwrap();
    let repo = ReviewRepository::from_csv(dir.path().join("absent.csv"), Duration::from_secs(60));
    assert!(repo.get().await.is_err());
    assert!(repo.age().await.is_none());
}

// ============================================================
// Filters and statistics
// ============================================================

#[test]
fn filters_and_stats_over_loaded_data() {
    let file = csv_file(CSV);
    let reviews = load_reviews(file.path()).unwrap();

    let stats = dataset_stats(&reviews);
    assert_eq!(stats.total_reviews, 5);
    assert_eq!(stats.total_hotels, 3);
    assert_eq!(stats.total_countries, 4);
    assert_eq!(stats.sentiment_distribution["positive"], 2);
    assert_eq!(stats.sentiment_distribution["negative"], 3);
    assert_eq!(stats.score_distribution["(8, 10]"], 1);
    assert_eq!(stats.score_distribution["(0, 2]"], 1);

    assert_eq!(
        distinct_hotels(&reviews),
        vec!["Ritz", "Savoy", UNKNOWN_HOTEL]
    );
    assert_eq!(distinct_nationalities(&reviews).len(), 4);

    let uk = FilterParams {
        nationality: Some("United Kingdom".to_string()),
        ..Default::default()
    };
    let picked = apply_filters(&reviews, &uk);
    assert_eq!(picked.len(), 2);

    let metrics = aggregated_metrics(&picked, &uk);
    assert_eq!(metrics.total_reviews, 2);
    assert_eq!(metrics.top_hotels.len(), 2);

    let high = FilterParams {
        score_min: 7.0,
        ..Default::default()
    };
    let hotels: Vec<&str> = apply_filters(&reviews, &high)
        .iter()
        .map(|r| r.hotel.as_str())
        .collect();
    assert_eq!(hotels, vec!["Ritz", "Savoy"]);
}

#[test]
fn word_cloud_over_loaded_data() {
    let file = csv_file(CSV);
    let reviews = load_reviews(file.path()).unwrap();
    let refs: Vec<_> = reviews.iter().collect();

    let cloud = word_cloud(&refs, &build_stopwords(), 100, 5000, 42);
    assert_eq!(cloud.words["breakfast"], 2);
    assert_eq!(cloud.words["spotless"], 2);
    assert!(!cloud.words.contains_key("was"));
    assert!(cloud.words.keys().all(|w| w.chars().count() > 2));
}
