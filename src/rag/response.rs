//! Answer generation from retrieved document chunks.

use super::{context::format_context_for_prompt, ContextBuilder, ContextChunk, QuestionAnswerer};
use crate::config::{Prompts, Settings};
use crate::embedding::Embedder;
use crate::error::{Result, StaffdeskError};
use crate::openai::create_client_with_timeout;
use crate::vector_store::VectorStore;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Answer given when no chunk clears the similarity threshold.
pub const NO_MATCH_ANSWER: &str =
    "I couldn't find any relevant information in the documents for this question.";

/// Document question-answering engine.
pub struct RagEngine {
    client: Client<OpenAIConfig>,
    model: String,
    temperature: f32,
    context_builder: ContextBuilder,
    prompts: Prompts,
}

impl RagEngine {
    /// Create a new engine.
    pub fn new(client: Client<OpenAIConfig>, model: &str, context_builder: ContextBuilder) -> Self {
        Self {
            client,
            model: model.to_string(),
            temperature: 0.0,
            context_builder,
            prompts: Prompts::default(),
        }
    }

    /// Build an engine from settings over an existing index.
    pub fn from_settings(
        settings: &Settings,
        prompts: Prompts,
        vector_store: Arc<dyn VectorStore>,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self> {
        let api_key = settings.llm.api_key();
        let client = create_client_with_timeout(
            &settings.llm.api_base,
            api_key.as_deref(),
            Duration::from_secs(settings.llm.timeout_secs),
        )?;
        let model = settings.docs.model.as_deref().unwrap_or(&settings.llm.model);

        let context_builder = ContextBuilder::new(vector_store, embedder)
            .with_max_chunks(settings.docs.max_context_chunks)
            .with_min_score(settings.docs.min_score);

        Ok(Self::new(client, model, context_builder)
            .with_prompts(prompts)
            .with_temperature(settings.llm.temperature))
    }

    /// Set custom prompts (with user-defined variables).
    pub fn with_prompts(mut self, prompts: Prompts) -> Self {
        self.prompts = prompts;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Ask a single question and get a response.
    #[instrument(skip(self), fields(question = %question))]
    pub async fn ask(&self, question: &str) -> Result<RagResponse> {
        info!("Processing question: {}", question);

        let context_chunks = self.context_builder.build(question).await?;

        if context_chunks.is_empty() {
            return Ok(RagResponse {
                answer: NO_MATCH_ANSWER.to_string(),
                sources: Vec::new(),
            });
        }

        let mut vars = HashMap::new();
        vars.insert("question".to_string(), question.to_string());
        vars.insert("context".to_string(), format_context_for_prompt(&context_chunks));

        let user_prompt = self.prompts.render_with_custom(&self.prompts.doc_qa.user, &vars);
        let system_prompt = self
            .prompts
            .render_with_custom(&self.prompts.doc_qa.system, &HashMap::new());

        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(system_prompt)
                .build()
                .map_err(|e| StaffdeskError::Agent(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(user_prompt)
                .build()
                .map_err(|e| StaffdeskError::Agent(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .build()
            .map_err(|e| StaffdeskError::Agent(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            StaffdeskError::OpenAI(format!("Failed to generate response: {}", e))
        })?;

        let answer = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| StaffdeskError::Agent("Empty response from LLM".to_string()))?
            .clone();

        debug!("Generated response with {} sources", context_chunks.len());

        Ok(RagResponse {
            answer,
            sources: context_chunks,
        })
    }
}

#[async_trait]
impl QuestionAnswerer for RagEngine {
    async fn answer(&self, question: &str) -> Result<String> {
        Ok(self.ask(question).await?.answer)
    }
}

/// An answer with the chunks it was built from.
#[derive(Debug, Clone)]
pub struct RagResponse {
    /// The generated answer.
    pub answer: String,
    /// Source chunks used for the answer.
    pub sources: Vec<ContextChunk>,
}

impl RagResponse {
    /// File names the answer drew on, in first-seen order.
    pub fn source_files(&self) -> Vec<&str> {
        let mut files: Vec<&str> = Vec::new();
        for chunk in &self.sources {
            if !files.contains(&chunk.source.as_str()) {
                files.push(&chunk.source);
            }
        }
        files
    }
}
