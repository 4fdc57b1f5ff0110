/// Default upper bound on words per documentation chunk
pub const DEFAULT_MAX_WORDS: usize = 30_000;

/// Splits `text` on whitespace into chunks of at most `max_words` words
///
/// Words inside a chunk are joined with single spaces and chunks keep the
/// original word order. Text with no words yields no chunks; a `max_words`
/// of zero is treated as one.
pub fn split_into_chunks(text: &str, max_words: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(max_words.max(1))
        .map(|chunk| chunk.join(" "))
        .collect()
}
