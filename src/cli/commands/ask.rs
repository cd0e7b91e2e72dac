//! Ask command implementation.

use crate::chunking::ChunkingConfig;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::docs::DocumentIndexer;
use crate::embedding::{Embedder, OpenAIEmbedder};
use crate::rag::RagEngine;
use crate::vector_store::{MemoryVectorStore, VectorStore};
use anyhow::Result;
use tracing::debug;
use std::sync::Arc;

/// Index the documents directory and answer one question.
pub async fn run_ask(question: &str, settings: Settings) -> Result<()> {
    if let Err(e) = preflight::check(Operation::Ask, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'staffdesk doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let dir = settings.docs_dir();
    if !dir.is_dir() {
        Output::error(&format!("Documents directory not found: {}", dir.display()));
        anyhow::bail!("no documents directory");
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let embedder: Arc<dyn Embedder> = Arc::new(OpenAIEmbedder::from_settings(&settings.embedding)?);
    let vector_store: Arc<dyn VectorStore> = Arc::new(MemoryVectorStore::new());

    let spinner = Output::spinner("Indexing documents...");
    let indexer = DocumentIndexer::new(
        embedder.clone(),
        vector_store.clone(),
        ChunkingConfig {
            chunk_chars: settings.docs.chunk_chars,
            chunk_overlap: settings.docs.chunk_overlap,
        },
    );
    let summary = match indexer.index_dir(&dir).await {
        Ok(summary) => summary,
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to index documents: {}", e));
            return Err(e.into());
        }
    };

    if summary.sources.is_empty() {
        spinner.finish_and_clear();
        Output::warning(&format!("No .txt or .md documents in {}", dir.display()));
        return Ok(());
    }
    debug!("Indexed sources: {}", summary.sources.join(", "));

    spinner.set_message(format!(
        "Searching {} documents ({} chunks)...",
        summary.files, summary.chunks
    ));

    let engine = RagEngine::from_settings(&settings, prompts, vector_store, embedder)?;

    match engine.ask(question).await {
        Ok(response) => {
            spinner.finish_and_clear();

            println!("\n{}\n", response.answer);

            if !response.sources.is_empty() {
                Output::header("Sources");
                for source in &response.sources {
                    Output::source(&source.source, source.score, &source.content);
                }
            }
        }
        Err(e) => {
            spinner.finish_and_clear();
            Output::error(&format!("Failed to generate answer: {}", e));
            return Err(e.into());
        }
    }

    Ok(())
}
