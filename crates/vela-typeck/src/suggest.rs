//! "Did you mean" suggestions via Levenshtein distance.

/// Classic dynamic-programming edit distance between two strings, by char.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let cost = if ca == cb { 0 } else { 1 };
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Up to three candidate names within edit distance 2 of `target`, sorted
/// ascending by distance then by name.
pub fn suggest(target: &str, candidates: impl IntoIterator<Item = impl AsRef<str>>) -> Vec<String> {
    const THRESHOLD: usize = 2;
    const MAX_SUGGESTIONS: usize = 3;

    let mut scored: Vec<(usize, String)> = candidates
        .into_iter()
        .map(|c| c.as_ref().to_string())
        .filter(|c| c != target)
        .map(|c| (levenshtein(target, &c), c))
        .filter(|(dist, _)| *dist <= THRESHOLD)
        .collect();

    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().take(MAX_SUGGESTIONS).map(|(_, name)| name).collect()
}
