// Review text normalization.
//
// The raw dataset fills empty review halves with placeholder phrases
// ("No Negative" / "No Positive"). Those carry no content and would otherwise
// leak into every topic, so they are stripped before anything else sees the text.

/// Placeholders the dataset uses when a reviewer left a half of the review blank.
pub const PLACEHOLDERS: [&str; 2] = ["No Negative", "No Positive"];

/// Strip placeholders, collapse whitespace runs to one space, and trim.
///
/// `None` normalizes to the empty string. The result is a fixed point:
/// normalizing it again returns it unchanged, even when removing one
/// placeholder splices together the pieces of another.
pub fn normalize(text: Option<&str>) -> String {
    let mut current = match text {
        Some(t) => single_pass(t),
        None => return String::new(),
    };
    loop {
        let next = single_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Convenience wrapper for callers holding a plain `&str`.
pub fn normalize_str(text: &str) -> String {
    normalize(Some(text))
}

fn single_pass(text: &str) -> String {
    let mut stripped = text.to_string();
    for placeholder in PLACEHOLDERS {
        stripped = stripped.replace(placeholder, "");
    }
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Join the positive and negative halves of a review into one document.
///
/// Both halves are normalized first; the joined text has any leading or
/// trailing periods and spaces removed so a missing half leaves no stray ". ".
pub fn compose_review(positive: Option<&str>, negative: Option<&str>) -> String {
    let positive = normalize(positive);
    let negative = normalize(negative);
    format!("{positive}. {negative}")
        .trim_matches(|c| c == '.' || c == ' ')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_none_is_empty() {
        assert_eq!(normalize(None), "");
    }

    #[test]
    fn test_strips_placeholders() {
        assert_eq!(normalize_str("No Negative"), "");
        assert_eq!(
            normalize_str("Great location No Positive"),
            "Great location"
        );
    }

    #[test]
    fn test_placeholder_match_is_case_sensitive() {
        assert_eq!(normalize_str("no negative"), "no negative");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(
            normalize_str("  bed \t was\n\n  comfy  "),
            "bed was comfy"
        );
    }

    #[test]
    fn test_nested_placeholder_is_fully_removed() {
        // Removing the inner placeholder exposes an outer one.
        assert_eq!(normalize_str("No No PositivePositive"), "");
        assert_eq!(normalize_str("No  Positive"), "");
    }

    #[test]
    fn test_idempotent_on_tricky_inputs() {
        let inputs = [
            "",
            "   ",
            "No Negative No Positive",
            "No No NegativeNegative rest",
            "a\u{00a0}b  c",
            "Staff were lovely.\r\nNo Positive",
        ];
        for input in inputs {
            let once = normalize_str(input);
            assert_eq!(normalize_str(&once), once, "input {input:?}");
        }
    }

    #[test]
    fn test_compose_review_both_halves() {
        assert_eq!(
            compose_review(Some("Lovely staff"), Some("Tiny room")),
            "Lovely staff. Tiny room"
        );
    }

    #[test]
    fn test_compose_review_missing_half() {
        assert_eq!(compose_review(Some("No Positive"), Some("Noisy")), "Noisy");
        assert_eq!(compose_review(Some("Clean"), Some("No Negative")), "Clean");
        assert_eq!(compose_review(None, None), "");
    }
}
