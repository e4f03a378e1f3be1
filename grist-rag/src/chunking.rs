//! Document chunking.
//!
//! This module provides the [`Chunker`] trait and [`RecursiveChunker`], which
//! splits text at natural boundaries (paragraphs, then sentences, then words)
//! and falls back to hard character cuts only when a single word exceeds the
//! chunk size.

use std::collections::VecDeque;

use crate::error::{RagError, Result};

/// A strategy for splitting raw text into chunk strings.
///
/// Implementations must be deterministic: the same input always produces the
/// same chunk sequence, so re-indexing a document is reproducible.
pub trait Chunker: Send + Sync {
    /// Split text into ordered chunks.
    ///
    /// Returns an empty `Vec` for empty input and at least one chunk for any
    /// non-empty input.
    fn chunk(&self, text: &str) -> Vec<String>;
}

/// Boundary preference for recursive splitting: paragraphs, then sentence
/// ends, then words. Hard character cuts apply only below word level.
const SEPARATORS: [&str; 5] = ["\n\n", ". ", "! ", "? ", " "];

/// Splits text recursively at natural boundaries with a sliding overlap.
///
/// Sizes are measured in characters. Separators stay attached to the segment
/// they terminate, so concatenating the chunks (minus overlaps) reproduces
/// the original text. Consecutive chunks share a trailing window of at most
/// `chunk_overlap` characters to preserve context across boundaries.
///
/// # Example
///
/// ```rust,ignore
/// use grist_rag::RecursiveChunker;
///
/// let chunker = RecursiveChunker::new(500, 50)?;
/// let chunks = chunker.chunk(&document.text);
/// ```
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if `chunk_size` is zero or
    /// `chunk_overlap >= chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".to_string()));
        }
        if chunk_overlap >= chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({chunk_overlap}) must be less than chunk_size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, chunk_overlap })
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        split_recursive(text, self.chunk_size, self.chunk_overlap, &SEPARATORS)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Split text at a separator while keeping the separator attached to the
/// preceding segment, so no characters are lost.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut result = Vec::new();
    let mut start = 0;

    while let Some(pos) = text[start..].find(separator) {
        let end = start + pos + separator.len();
        result.push(&text[start..end]);
        start = end;
    }

    if start < text.len() {
        result.push(&text[start..]);
    }

    result
}

/// Hard character cuts with overlap, for text with no usable boundary.
fn split_by_size(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return Vec::new();
    }

    // step > 0 is guaranteed by constructor validation
    let step = chunk_size - chunk_overlap;
    let mut chunks = Vec::new();
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(chars.len());
        chunks.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }

    chunks
}

/// Merge segments (each at most `chunk_size` characters) into chunks,
/// carrying a trailing window of at most `chunk_overlap` characters from one
/// chunk into the next.
fn merge_with_overlap(segments: &[String], chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<&str> = VecDeque::new();
    let mut window_len = 0usize;

    for segment in segments {
        let segment_len = char_len(segment);
        if window_len + segment_len > chunk_size && !window.is_empty() {
            chunks.push(window.iter().copied().collect::<String>());
            // Shrink the window to at most the overlap, and far enough
            // that the incoming segment fits.
            while !window.is_empty()
                && (window_len > chunk_overlap || window_len + segment_len > chunk_size)
            {
                if let Some(front) = window.pop_front() {
                    window_len -= char_len(front);
                }
            }
        }
        window.push_back(segment);
        window_len += segment_len;
    }

    if !window.is_empty() {
        chunks.push(window.iter().copied().collect::<String>());
    }

    chunks
}

/// Split text by the first applicable separator, recursing into segments
/// that still exceed `chunk_size` with the next-level separator.
fn split_recursive(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
    separators: &[&str],
) -> Vec<String> {
    if char_len(text) <= chunk_size {
        return vec![text.to_string()];
    }

    let Some((separator, remaining)) = separators.split_first() else {
        return split_by_size(text, chunk_size, chunk_overlap);
    };

    let segments = split_keeping_separator(text, separator);
    if segments.len() <= 1 {
        // Separator not present at this level; try the next one.
        return split_recursive(text, chunk_size, chunk_overlap, remaining);
    }

    let mut chunks = Vec::new();
    let mut pending: Vec<String> = Vec::new();

    for segment in segments {
        if char_len(segment) <= chunk_size {
            pending.push(segment.to_string());
        } else {
            // Flush merged chunks before the oversized segment so ordering
            // is preserved, then break the segment down a level.
            if !pending.is_empty() {
                chunks.extend(merge_with_overlap(&pending, chunk_size, chunk_overlap));
                pending.clear();
            }
            chunks.extend(split_recursive(segment, chunk_size, chunk_overlap, remaining));
        }
    }

    if !pending.is_empty() {
        chunks.extend(merge_with_overlap(&pending, chunk_size, chunk_overlap));
    }

    chunks
}
