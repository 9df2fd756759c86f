// Stopword set construction.
//
// Three sources are unioned:
//   1. a base general-English list (the classic 318-word list used by most
//      bag-of-words vectorizers), embedded so it is always available;
//   2. hospitality-review noise words: generic praise, booking vocabulary and
//      filler that shows up in nearly every review and drowns out topics;
//   3. optionally, the larger `stop-words` crate corpus and a user file.
//
// Everything is lowercased on insertion.

use std::collections::HashSet;
use std::path::PathBuf;

use stop_words::{get, LANGUAGE};
use tracing::{debug, warn};

/// General-English stopwords.
pub const BASE_ENGLISH: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Words that appear in almost every hotel review regardless of what the
/// reviewer is actually talking about.
pub const HOSPITALITY_NOISE: &[&str] = &[
    "hotel", "hotels", "room", "rooms", "stay", "stayed", "staying", "night", "nights", "good",
    "great", "nice", "excellent", "lovely", "really", "just", "got", "bit", "little", "lot",
    "didn", "don", "wasn", "isn", "couldn", "negative", "positive", "review", "booking",
    "booked", "book", "place", "time", "day", "days", "definitely", "absolutely", "overall",
    "quite", "thing", "things", "way", "make", "went", "came", "say", "like",
];

/// Where the optional extra stopwords come from.
#[derive(Debug, Clone, Default)]
pub struct StopwordOptions {
    /// Union the larger `stop-words` crate English corpus.
    pub extended: bool,
    /// Newline-separated file of additional stopwords. Lines starting with
    /// `#` are comments.
    pub extra_path: Option<PathBuf>,
}

/// Base list, domain list and the extended corpus.
pub fn build_stopwords() -> HashSet<String> {
    build_stopwords_with(&StopwordOptions {
        extended: true,
        extra_path: None,
    })
}

/// Build the stopword set from the embedded lists plus whatever optional
/// sources `options` names. An unreadable extra file is logged and skipped.
pub fn build_stopwords_with(options: &StopwordOptions) -> HashSet<String> {
    let mut set: HashSet<String> = BASE_ENGLISH
        .iter()
        .chain(HOSPITALITY_NOISE.iter())
        .map(|w| w.to_lowercase())
        .collect();

    if options.extended {
        let corpus: Vec<String> = get(LANGUAGE::English);
        set.extend(corpus.into_iter().map(|w| w.trim().to_lowercase()));
    }

    if let Some(path) = &options.extra_path {
        match std::fs::read_to_string(path) {
            Ok(contents) => {
                let before = set.len();
                set.extend(
                    contents
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty() && !l.starts_with('#'))
                        .map(str::to_lowercase),
                );
                debug!(
                    path = %path.display(),
                    added = set.len() - before,
                    "Loaded extra stopwords"
                );
            }
            Err(e) => {
                warn!(
                    path = %path.display(),
                    error = %e,
                    "Extra stopword file unavailable, continuing with built-in lists"
                );
            }
        }
    }

    set.remove("");
    set
}
