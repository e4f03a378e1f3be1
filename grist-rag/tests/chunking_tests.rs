//! Behavior and property tests for the recursive chunker.

use grist_rag::chunking::{Chunker, RecursiveChunker};
use grist_rag::error::RagError;
use proptest::prelude::*;

/// A 1000-character passage of 200 distinct five-character words
/// (`w000 ` … `w199 `), so overlap windows are easy to verify.
fn word_passage() -> String {
    (0..200).map(|i| format!("w{i:03} ")).collect()
}

/// Stitch chunks back together by locating each chunk's overlap with its
/// predecessor (the longest suffix of the previous chunk that prefixes the
/// next one).
fn reconstruct(chunks: &[String]) -> String {
    let mut text = String::new();
    for chunk in chunks {
        let max_overlap = text.len().min(chunk.len());
        let overlap = (0..=max_overlap)
            .rev()
            .find(|&k| text.ends_with(&chunk[..k]))
            .unwrap_or(0);
        text.push_str(&chunk[overlap..]);
    }
    text
}

#[test]
fn empty_input_yields_no_chunks() {
    let chunker = RecursiveChunker::new(500, 50).unwrap();
    assert!(chunker.chunk("").is_empty());
}

#[test]
fn short_input_yields_single_identical_chunk() {
    let chunker = RecursiveChunker::new(500, 50).unwrap();
    let text = "A short paragraph that fits in one chunk.";
    assert_eq!(chunker.chunk(text), vec![text.to_string()]);
}

#[test]
fn overlap_must_be_smaller_than_chunk_size() {
    assert!(matches!(RecursiveChunker::new(100, 100), Err(RagError::Config(_))));
    assert!(matches!(RecursiveChunker::new(100, 150), Err(RagError::Config(_))));
    assert!(matches!(RecursiveChunker::new(0, 0), Err(RagError::Config(_))));
}

#[test]
fn word_passage_splits_into_three_overlapping_chunks() {
    let chunker = RecursiveChunker::new(500, 50).unwrap();
    let text = word_passage();
    assert_eq!(text.chars().count(), 1000);

    let chunks = chunker.chunk(&text);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].chars().count(), 500);
    assert_eq!(chunks[1].chars().count(), 500);
    assert_eq!(chunks[2].chars().count(), 100);

    // Each chunk begins with the 50-character tail of its predecessor.
    assert!(chunks[1].starts_with(&chunks[0][chunks[0].len() - 50..]));
    assert!(chunks[2].starts_with(&chunks[1][chunks[1].len() - 50..]));

    assert_eq!(reconstruct(&chunks), text);
}

#[test]
fn unbroken_text_falls_back_to_hard_character_cuts() {
    let chunker = RecursiveChunker::new(500, 50).unwrap();
    let text = "x".repeat(1000);

    let chunks = chunker.chunk(&text);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].len(), 500);
    assert_eq!(chunks[1].len(), 500);
    assert_eq!(chunks[2].len(), 100);
}

#[test]
fn paragraph_boundaries_are_preferred() {
    let chunker = RecursiveChunker::new(100, 10).unwrap();
    let first = format!("{}\n\n", "a".repeat(79));
    let second = "b".repeat(80);
    let text = format!("{first}{second}");

    let chunks = chunker.chunk(&text);
    assert_eq!(chunks, vec![first, second]);
}

#[test]
fn long_paragraph_splits_at_sentence_boundaries() {
    let chunker = RecursiveChunker::new(80, 0).unwrap();
    let text = "The first sentence is here. The second sentence follows it. \
                The third sentence closes the paragraph.";

    let chunks = chunker.chunk(&text);
    assert!(chunks.len() >= 2);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 80);
    }
    // With zero overlap the chunks concatenate back to the input.
    assert_eq!(chunks.concat(), text);
}

#[test]
fn multibyte_text_never_splits_mid_character() {
    let chunker = RecursiveChunker::new(10, 2).unwrap();
    let text = "äöü".repeat(20);

    let chunks = chunker.chunk(&text);
    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 10);
    }
}

proptest! {
    #[test]
    fn non_empty_input_yields_at_least_one_bounded_chunk(
        text in "[a-zA-Z .\n]{1,600}",
        chunk_size in 10usize..80,
        overlap_fraction in 0usize..10,
    ) {
        let chunk_overlap = (chunk_size * overlap_fraction / 20).min(chunk_size - 1);
        let chunker = RecursiveChunker::new(chunk_size, chunk_overlap).unwrap();

        let chunks = chunker.chunk(&text);
        prop_assert!(!chunks.is_empty());
        for chunk in &chunks {
            prop_assert!(!chunk.is_empty());
            prop_assert!(chunk.chars().count() <= chunk_size);
        }
    }

    #[test]
    fn chunking_is_deterministic(
        text in "[a-z .\n]{1,400}",
        chunk_size in 10usize..60,
    ) {
        let chunker = RecursiveChunker::new(chunk_size, chunk_size / 4).unwrap();
        prop_assert_eq!(chunker.chunk(&text), chunker.chunk(&text));
    }
}
