//! Fixed-size sliding-window text chunking
//!
//! Window `i` starts at character `i * (chunk_size - overlap)`, so
//! consecutive chunks share exactly `overlap` characters; the final window
//! may be shorter but is always emitted. Offsets are character counts and
//! slicing stays on UTF-8 boundaries.

use crate::error::{Error, Result};
use crate::types::{Chunk, Document};

/// A chunk span before it is bound to a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpan {
    /// Index in the emitted sequence
    pub index: u32,
    /// Start offset in characters (inclusive)
    pub char_start: usize,
    /// End offset in characters (exclusive)
    pub char_end: usize,
    /// The window's text
    pub text: String,
}

/// Text chunker with configurable size and overlap
pub struct TextChunker {
    /// Chunk size in characters
    chunk_size: usize,
    /// Overlap between consecutive chunks
    overlap: usize,
}

impl TextChunker {
    /// Create a new chunker; fails unless `chunk_size > 0` and
    /// `overlap < chunk_size`
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(Error::Config("chunk_size must be greater than zero".to_string()));
        }
        if overlap >= chunk_size {
            return Err(Error::Config(format!(
                "chunk_overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    /// Split `text` into ordered, overlapping spans covering all of it.
    /// Empty text yields no spans; whitespace-only text yields one.
    pub fn chunk(&self, text: &str) -> Vec<ChunkSpan> {
        // Byte offset of every character, so char-based windows slice safely
        let char_offsets: Vec<usize> = text.char_indices().map(|(b, _)| b).collect();
        let total_chars = char_offsets.len();

        if total_chars == 0 {
            return Vec::new();
        }

        let stride = self.chunk_size - self.overlap;
        let mut spans = Vec::new();
        let mut start = 0usize;
        let mut index = 0u32;

        loop {
            let end = (start + self.chunk_size).min(total_chars);
            let byte_start = char_offsets[start];
            let byte_end = if end == total_chars {
                text.len()
            } else {
                char_offsets[end]
            };

            spans.push(ChunkSpan {
                index,
                char_start: start,
                char_end: end,
                text: text[byte_start..byte_end].to_string(),
            });

            if end == total_chars {
                break;
            }
            start += stride;
            index += 1;
        }

        spans
    }

    /// Chunk a document's extracted text into `Chunk`s with citation
    /// metadata attached
    pub fn chunk_document(&self, doc: &Document, text: &str) -> Vec<Chunk> {
        self.chunk(text)
            .into_iter()
            .map(|span| Chunk::new(doc, span.text, span.index, span.char_start, span.char_end))
            .collect()
    }
}
