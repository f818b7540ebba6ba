//! Frequency-based keyword extraction

use std::collections::HashMap;

/// Keywords returned per draft
pub const MAX_KEYWORDS: usize = 10;

/// Words too common in email to say anything about a draft
const EMAIL_FILLER: &[&str] = &["email", "thanks", "dear", "hello", "regards"];

const STOP_WORDS: &[&str] = &[
    "about", "above", "after", "again", "against", "all", "and", "any", "are", "aren't",
    "because", "been", "before", "being", "below", "between", "both", "but", "can", "couldn't",
    "did", "didn't", "does", "doesn't", "doing", "don't", "down", "during", "each", "few", "for",
    "from", "further", "had", "hadn't", "has", "hasn't", "have", "haven't", "having", "her",
    "here", "hers", "herself", "him", "himself", "his", "how", "into", "isn't", "its", "itself",
    "just", "let", "more", "most", "mustn't", "myself", "nor", "not", "now", "off", "once",
    "only", "other", "our", "ours", "ourselves", "out", "over", "own", "same", "shan't", "she",
    "should", "shouldn't", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "themselves", "then", "there", "these", "they", "this", "those", "through", "too", "under",
    "until", "very", "was", "wasn't", "were", "weren't", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "won't", "would", "wouldn't", "you", "your",
    "yours", "yourself", "yourselves",
];

/// Up to [`MAX_KEYWORDS`] most frequent content words, ties in order of first use
pub fn extract(text: &str) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();

    let words = text
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .map(|w| w.trim_matches('\'').to_lowercase())
        .filter(|w| w.chars().count() > 2 && w.chars().all(char::is_alphanumeric))
        .filter(|w| !STOP_WORDS.contains(&w.as_str()) && !EMAIL_FILLER.contains(&w.as_str()));

    for (position, word) in words.enumerate() {
        counts
            .entry(word)
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<(String, usize, usize)> = counts
        .into_iter()
        .map(|(word, (count, first))| (word, count, first))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.2.cmp(&b.2)));

    ranked
        .into_iter()
        .take(MAX_KEYWORDS)
        .map(|(word, _, _)| word)
        .collect()
}
