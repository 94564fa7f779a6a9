use std::sync::LazyLock;

use regex::Regex;

static URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"http\S+").expect("valid URL regex"));

/// Normalizes one tweet.
///
/// URLs go first so their punctuation cannot leave stray letters behind, then
/// everything except ASCII letters and whitespace is dropped, the rest is
/// lowercased and whitespace runs collapse to single spaces.
///
/// # Example
/// ```
/// use tweet_insight::clean_text;
/// assert_eq!(clean_text("Check http://example.com NOW!!"), "check now");
/// assert_eq!(clean_text(""), "");
/// ```
pub fn clean_text(text: &str) -> String {
    let without_urls = URL.replace_all(text, "");
    let letters: String = without_urls
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    letters.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Whitespace tokens of two or more letters, the unit counted by both the
/// word cloud and the vectorizer.
pub fn tokens(cleaned: &str) -> impl Iterator<Item = &str> {
    cleaned.split_whitespace().filter(|w| w.len() > 1)
}
