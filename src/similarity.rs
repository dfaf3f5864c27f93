use std::collections::HashSet;

/// Set of words with at least `min_chars` characters.
pub fn word_set<'a, I>(words: I, min_chars: usize) -> HashSet<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    words
        .into_iter()
        .filter(|w| w.chars().count() >= min_chars)
        .collect()
}

/// Jaccard overlap of two word sets: |A ∩ B| / |A ∪ B|, 0 when either is empty.
pub fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.iter().filter(|w| b.contains(*w)).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Word-overlap similarity of two normalized strings, ignoring short words.
pub fn text_similarity(a: &str, b: &str, min_chars: usize) -> f64 {
    jaccard(&word_set(a.split(' '), min_chars), &word_set(b.split(' '), min_chars))
}
