//! Word-count chunking shared by storage and embedding.
//!
//! Text is split on Unicode whitespace into groups of `chunk_size` words; the
//! last group may be shorter. Chunk indices are 0-based and contiguous.
use crate::types::Chunk;

pub const DEFAULT_CHUNK_SIZE: usize = 256;

/// Split `text` into word chunks. Empty or whitespace-only text yields none.
///
/// A `chunk_size` of zero is treated as one word per chunk.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<Chunk> {
    let words: Vec<&str> = text.split_whitespace().collect();
    words
        .chunks(chunk_size.max(1))
        .enumerate()
        .map(|(index, group)| Chunk { index, text: group.join(" ") })
        .collect()
}

/// Number of chunks `chunk_text` produces for `word_count` words.
pub fn expected_chunks(word_count: usize, chunk_size: usize) -> usize {
    word_count.div_ceil(chunk_size.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn six_hundred_words_make_three_chunks() {
        let chunks = chunk_text(&words(600), 256);
        let sizes: Vec<usize> = chunks.iter().map(|c| c.text.split_whitespace().count()).collect();
        assert_eq!(sizes, vec![256, 256, 88]);
        assert_eq!(chunks.iter().map(|c| c.index).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(expected_chunks(600, 256), 3);
    }

    #[test]
    fn empty_and_whitespace_text_yield_no_chunks() {
        assert!(chunk_text("", 256).is_empty());
        assert!(chunk_text(" \n\t  ", 256).is_empty());
        assert_eq!(expected_chunks(0, 256), 0);
    }

    #[test]
    fn chunking_is_deterministic_and_order_preserving() {
        let text = "alpha  beta\ngamma\tdelta epsilon";
        let a = chunk_text(text, 2);
        let b = chunk_text(text, 2);
        assert_eq!(a, b);
        let texts: Vec<&str> = a.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["alpha beta", "gamma delta", "epsilon"]);
    }

    #[test]
    fn zero_chunk_size_does_not_panic() {
        assert_eq!(chunk_text("a b", 0).len(), 2);
        assert_eq!(expected_chunks(2, 0), 2);
    }
}
