// Presentation of extracted topics.
//
// Extraction returns structured (id, keywords) pairs; anything shaped like
// "Topic 3: breakfast, staff, clean" is produced here and never parsed back.

use colored::Colorize;

use super::extract::ExtractedTopic;

/// Single-line rendering, e.g. `Topic 2: pool, spa, gym`.
pub fn topic_line(topic: &ExtractedTopic) -> String {
    format!("Topic {}: {}", topic.topic_id, topic.keywords_joined())
}

/// Print a titled, coloured topic listing to the terminal.
pub fn print_topics(title: &str, document_count: usize, topics: &[ExtractedTopic]) {
    println!(
        "\n{}",
        format!("=== {title} ({document_count} reviews) ===").bold()
    );
    println!();

    if topics.is_empty() {
        println!("  {}", "No topics extracted.".dimmed());
        println!();
        return;
    }

    for topic in topics {
        let (lead, rest) = match topic.keywords.split_first() {
            Some((first, rest)) => (first.as_str(), rest.join(", ")),
            None => ("", String::new()),
        };
        println!(
            "  {:>2}. {} {}",
            topic.topic_id,
            lead.bright_green().bold(),
            rest.dimmed()
        );
    }
    println!();
}
