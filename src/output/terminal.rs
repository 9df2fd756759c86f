// Colored terminal output for dataset statistics and topic assignments.
//
// Topic keyword listings live in topics::display; this module covers the
// dataset-level views the CLI prints around them.

use colored::Colorize;

use crate::dataset::models::{Review, SentimentLabel};
use crate::dataset::stats::DatasetStats;
use crate::topics::DocumentTopic;

/// Display whole-dataset statistics as a small report.
pub fn display_dataset_stats(stats: &DatasetStats) {
    println!("\n{}", "=== Dataset Statistics ===".bold());
    println!();
    println!("  Reviews:        {}", stats.total_reviews);
    println!("  Hotels:         {}", stats.total_hotels);
    println!("  Nationalities:  {}", stats.total_countries);
    println!("  Average score:  {:.2}", stats.average_score);

    println!("\n  {}", "Sentiment".dimmed());
    for (label, count) in &stats.sentiment_distribution {
        let colored_label = match label.parse::<SentimentLabel>() {
            Ok(SentimentLabel::Positive) => label.green(),
            Ok(SentimentLabel::Negative) => label.red(),
            _ => label.normal(),
        };
        println!("    {:<10} {:>8}", colored_label, count);
    }

    println!("\n  {}", "Reviewer score".dimmed());
    let max = stats.score_distribution.values().copied().max().unwrap_or(0);
    let bar_width: usize = 30;
    for (bin, count) in &stats.score_distribution {
        let filled = if max == 0 {
            0
        } else {
            (*count as f64 / max as f64 * bar_width as f64).round() as usize
        };
        println!(
            "    {:<8} {:>8} {}",
            bin,
            count,
            "=".repeat(filled).bright_blue()
        );
    }
    println!();
}

/// Display how many documents each topic dominates, with one example review.
pub fn display_topic_assignment(assignments: &[DocumentTopic], reviews: &[&Review], n_topics: usize) {
    println!(
        "\n{}",
        format!("=== Dominant Topics ({} reviews) ===", assignments.len()).bold()
    );
    println!();

    for topic_id in 1..=n_topics {
        let members: Vec<(usize, &DocumentTopic)> = assignments
            .iter()
            .enumerate()
            .filter(|(_, a)| a.dominant_topic == topic_id)
            .collect();
        let share = if assignments.is_empty() {
            0.0
        } else {
            members.len() as f64 / assignments.len() as f64 * 100.0
        };
        println!(
            "  Topic {:>2}: {:>6} reviews ({:>5.1}%)",
            topic_id,
            members.len(),
            share
        );

        // Most confident member as the example
        let example = members
            .iter()
            .max_by(|a, b| a.1.probability.total_cmp(&b.1.probability))
            .and_then(|(i, _)| reviews.get(*i));
        if let Some(review) = example {
            println!(
                "      e.g. {}",
                super::truncate_chars(&review.text, 100).dimmed()
            );
        }
    }
    println!();
}
