//! Building the in-memory document index at startup.
//!
//! Text files (`.txt`, `.md`) in the documents directory are chunked,
//! embedded and stored in a [`MemoryVectorStore`].

use crate::chunking::{ChunkingConfig, TextChunker};
use crate::config::{Prompts, Settings};
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::error::Result;
use crate::rag::RagEngine;
use crate::vector_store::{Document, MemoryVectorStore, VectorStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

const DOCUMENT_EXTENSIONS: &[&str] = &["txt", "md"];

/// Outcome of indexing a directory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexSummary {
    pub files: usize,
    pub chunks: usize,
    /// Sources held by the store after indexing.
    pub sources: Vec<String>,
}

/// Chunks, embeds and stores documents.
pub struct DocumentIndexer {
    embedder: Arc<dyn Embedder>,
    vector_store: Arc<dyn VectorStore>,
    chunker: TextChunker,
}

impl DocumentIndexer {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        vector_store: Arc<dyn VectorStore>,
        config: ChunkingConfig,
    ) -> Self {
        Self {
            embedder,
            vector_store,
            chunker: TextChunker::new(config),
        }
    }

    /// Index one document, replacing earlier chunks from the same source.
    pub async fn index_text(&self, source: &str, text: &str) -> Result<usize> {
        let chunks = self.chunker.chunk(text);
        if chunks.is_empty() {
            debug!("{} has no text, skipping", source);
            return Ok(0);
        }

        let contents: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&contents).await?;

        let documents: Vec<Document> = chunks
            .into_iter()
            .zip(embeddings)
            .map(|(chunk, embedding)| {
                Document::new(source.to_string(), chunk.content, embedding, chunk.order)
            })
            .collect();

        self.vector_store.delete_by_source(source).await?;
        self.vector_store.upsert_batch(&documents).await
    }

    /// Index every document file directly inside `dir`.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub async fn index_dir(&self, dir: &Path) -> Result<IndexSummary> {
        let mut summary = IndexSummary::default();

        for path in document_files(dir)? {
            let source = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());
            let text = std::fs::read_to_string(&path)?;

            let count = self.index_text(&source, &text).await?;
            debug!("Indexed {} ({} chunks)", source, count);
            summary.files += 1;
            summary.chunks += count;
        }

        summary.sources = self.vector_store.sources().await?;
        info!("Indexed {} files ({} chunks)", summary.files, summary.chunks);
        Ok(summary)
    }
}

/// Document files in `dir`, sorted by name.
pub fn document_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| DOCUMENT_EXTENSIONS.contains(&e.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Build the document Q&A engine over a freshly indexed directory.
///
/// Returns `None` when document Q&A is disabled or the directory is missing.
pub async fn build_doc_qa(settings: &Settings, prompts: &Prompts) -> Result<Option<RagEngine>> {
    if !settings.docs.enabled {
        info!("Document Q&A disabled");
        return Ok(None);
    }

    let dir = settings.docs_dir();
    if !dir.is_dir() {
        warn!(
            "Documents directory {} not found, document Q&A is unavailable",
            dir.display()
        );
        return Ok(None);
    }

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
    let vector_store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());

    let indexer = DocumentIndexer::new(
        embedder.clone(),
        vector_store.clone(),
        ChunkingConfig {
            chunk_chars: settings.docs.chunk_chars,
            chunk_overlap: settings.docs.chunk_overlap,
        },
    );
    let summary = indexer.index_dir(&dir).await?;
    if summary.files == 0 {
        warn!("No .txt or .md documents in {}", dir.display());
    }

    let engine = RagEngine::from_settings(settings, prompts.clone(), vector_store, embedder)?;
    Ok(Some(engine))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::KeywordEmbedder;

    fn indexer(store: Arc<MemoryVectorStore>) -> DocumentIndexer {
        DocumentIndexer::new(
            Arc::new(KeywordEmbedder::new(&["vacation", "dental"])),
            store,
            ChunkingConfig {
                chunk_chars: 64,
                chunk_overlap: 0,
            },
        )
    }

    #[tokio::test]
    async fn test_index_dir_reads_text_and_markdown() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("handbook.md"), "Vacation is 20 days.").unwrap();
        std::fs::write(dir.path().join("benefits.txt"), "Dental is covered.").unwrap();
        std::fs::write(dir.path().join("logo.png"), [0u8, 1, 2]).unwrap();

        let store = Arc::new(MemoryVectorStore::new());
        let summary = indexer(store.clone()).index_dir(dir.path()).await.unwrap();

        assert_eq!(summary.files, 2);
        assert_eq!(summary.chunks, 2);
        assert_eq!(
            summary.sources,
            vec!["benefits.txt".to_string(), "handbook.md".to_string()]
        );
        assert_eq!(store.sources().await.unwrap(), summary.sources);
    }

    #[tokio::test]
    async fn test_reindexing_replaces_chunks() {
        let store = Arc::new(MemoryVectorStore::new());
        let indexer = indexer(store.clone());

        let long = "Vacation rules apply to everyone.\n\n".repeat(6);
        assert!(indexer.index_text("handbook.md", &long).await.unwrap() > 1);

        assert_eq!(indexer.index_text("handbook.md", "Vacation.").await.unwrap(), 1);
        assert_eq!(store.document_count().await.unwrap(), 1);
        assert_eq!(indexer.index_text("empty.md", "   ").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_dir_disables_doc_qa() {
        let dir = tempfile::tempdir().unwrap();
        let mut settings = Settings::default();
        settings.docs.data_dir = dir.path().join("absent").display().to_string();

        let engine = build_doc_qa(&settings, &Prompts::default()).await.unwrap();
        assert!(engine.is_none());

        settings.docs.enabled = false;
        assert!(build_doc_qa(&settings, &Prompts::default()).await.unwrap().is_none());
    }
}
