/// Derives the fuzzy join key for a school or institution name.
///
/// Lowercases, collapses whitespace and keeps the first `tokens` words.
/// Distinct schools sharing a long common prefix collide.
pub fn school_key(name: &str, tokens: usize) -> String {
    name.to_lowercase()
        .split_whitespace()
        .take(tokens)
        .collect::<Vec<_>>()
        .join(" ")
}
