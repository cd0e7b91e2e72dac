//! Embedding generation for document retrieval.
//!
//! Document chunks are embedded in batches while the documents directory is
//! indexed; questions are embedded one at a time when answering.

mod openai;

pub use openai::OpenAIEmbedder;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for multiple texts.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Width of every vector this embedder returns.
    fn dimensions(&self) -> usize;
}
