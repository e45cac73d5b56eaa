//! Text chunk splitting.

/// Split extracted text into indexable chunks.
///
/// Splits on line breaks, trims whitespace, and discards blank lines. The
/// index accepts any splitting policy that yields non-empty, position-ordered
/// chunks; this is the default policy the ingestion pipeline uses.
pub fn split_chunks(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
