//! Splitting documents into overlapping, paragraph-aligned chunks.

mod text;

pub use text::TextChunker;

use serde::{Deserialize, Serialize};

/// A chunk of a source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextChunk {
    /// Text content of this chunk.
    pub content: String,
    /// Order of this chunk in the document.
    pub order: i32,
}

/// Configuration for chunking.
#[derive(Debug, Clone)]
pub struct ChunkingConfig {
    /// Maximum chunk length in characters.
    pub chunk_chars: usize,
    /// Characters repeated from the end of the previous chunk.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_chars: 1200,
            chunk_overlap: 200,
        }
    }
}

impl ChunkingConfig {
    /// Clamp values so every chunk can make progress.
    pub fn normalized(&self) -> Self {
        let chunk_chars = self.chunk_chars.max(16);
        let chunk_overlap = if self.chunk_overlap >= chunk_chars {
            chunk_chars / 2
        } else {
            self.chunk_overlap
        };
        Self {
            chunk_chars,
            chunk_overlap,
        }
    }
}
