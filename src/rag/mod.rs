//! Question answering over the indexed documents.
//!
//! A question is embedded, the closest chunks are retrieved and the chat
//! model composes an answer from them, citing source file names.

pub mod context;
mod response;

pub use context::ContextBuilder;
pub use response::{RagEngine, RagResponse, NO_MATCH_ANSWER};

use crate::error::Result;
use crate::vector_store::SearchResult;
use async_trait::async_trait;

/// Anything that answers a free-form question about the documents.
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String>;
}

/// A retrieved chunk ready to be placed in a prompt.
#[derive(Debug, Clone)]
pub struct ContextChunk {
    /// File name of the source document.
    pub source: String,
    /// Position of the chunk within its source.
    pub chunk_order: i32,
    /// Text content.
    pub content: String,
    /// Similarity score.
    pub score: f32,
}

impl From<SearchResult> for ContextChunk {
    fn from(result: SearchResult) -> Self {
        Self {
            source: result.document.source,
            chunk_order: result.document.chunk_order,
            content: result.document.content,
            score: result.score,
        }
    }
}
