//! Agent runner with tool calling loop.

use crate::error::{Result, StaffdeskError};
use crate::models::{ChatMessage, ROLE_AI, ROLE_HUMAN};
use crate::tools::Toolset;
use async_openai::config::OpenAIConfig;
use async_openai::types::{
    ChatCompletionMessageToolCall, ChatCompletionRequestAssistantMessageArgs,
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestToolMessageArgs, ChatCompletionRequestUserMessageArgs,
    CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

/// Anything that turns a user utterance plus prior turns into an answer.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    async fn respond(&self, input: &str, history: &[ChatMessage]) -> Result<String>;
}

/// Agent that answers by letting the model call a fixed toolset.
pub struct Agent {
    client: Client<OpenAIConfig>,
    model: String,
    tools: Arc<dyn Toolset>,
    max_iterations: usize,
    temperature: f32,
    system_prompt: String,
}

impl Agent {
    /// Create a new agent with the given client, model and tools.
    pub fn new(client: Client<OpenAIConfig>, model: &str, tools: Arc<dyn Toolset>) -> Self {
        Self {
            client,
            model: model.to_string(),
            tools,
            max_iterations: 15,
            temperature: 0.0,
            system_prompt: String::new(),
        }
    }

    /// Set the system prompt.
    pub fn with_system_prompt(mut self, prompt: &str) -> Self {
        self.system_prompt = prompt.to_string();
        self
    }

    /// Set maximum iterations for the agent loop.
    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Run one turn: the new input on top of the caller's history.
    pub async fn run(&self, input: &str, history: &[ChatMessage]) -> Result<AgentResponse> {
        let mut messages = self.initial_messages(input, history)?;
        let definitions = self.tools.definitions();

        let mut iterations = 0;
        let mut tool_calls_made = Vec::new();

        loop {
            iterations += 1;
            if iterations > self.max_iterations {
                return Err(StaffdeskError::Agent(format!(
                    "Agent exceeded maximum iterations ({})",
                    self.max_iterations
                )));
            }

            debug!("Agent iteration {}", iterations);

            let mut request = CreateChatCompletionRequestArgs::default();
            request
                .model(&self.model)
                .messages(messages.clone())
                .temperature(self.temperature);
            if !definitions.is_empty() {
                request.tools(definitions.clone());
            }
            let request = request
                .build()
                .map_err(|e| StaffdeskError::Agent(e.to_string()))?;

            let response = self
                .client
                .chat()
                .create(request)
                .await
                .map_err(|e| StaffdeskError::OpenAI(format!("Agent API error: {}", e)))?;

            let choice = response
                .choices
                .first()
                .ok_or_else(|| StaffdeskError::Agent("No response from model".to_string()))?;

            let tool_calls = match choice.message.tool_calls {
                Some(ref calls) if !calls.is_empty() => calls,
                _ => {
                    return Ok(AgentResponse {
                        content: choice.message.content.clone().unwrap_or_default(),
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }
            };

            // Add assistant message with tool calls to history
            let assistant_msg = ChatCompletionRequestAssistantMessageArgs::default()
                .tool_calls(tool_calls.clone())
                .build()
                .map_err(|e| StaffdeskError::Agent(e.to_string()))?;
            messages.push(assistant_msg.into());

            for tool_call in tool_calls {
                let record = self.execute_tool_call(tool_call).await;

                if record.return_direct {
                    info!("Tool '{}' answered directly", record.name);
                    let content = record.result.clone();
                    tool_calls_made.push(record);
                    return Ok(AgentResponse {
                        content,
                        tool_calls: tool_calls_made,
                        iterations,
                    });
                }

                let tool_msg = ChatCompletionRequestToolMessageArgs::default()
                    .tool_call_id(&tool_call.id)
                    .content(record.result.clone())
                    .build()
                    .map_err(|e| StaffdeskError::Agent(e.to_string()))?;
                messages.push(tool_msg.into());

                tool_calls_made.push(record);
            }
        }
    }

    /// System prompt, then prior turns, then the new input.
    ///
    /// `human` turns become user messages and `ai` turns assistant messages;
    /// any other role is skipped.
    fn initial_messages(
        &self,
        input: &str,
        history: &[ChatMessage],
    ) -> Result<Vec<ChatCompletionRequestMessage>> {
        let mut messages: Vec<ChatCompletionRequestMessage> = Vec::with_capacity(history.len() + 2);

        if !self.system_prompt.is_empty() {
            messages.push(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(self.system_prompt.clone())
                    .build()
                    .map_err(|e| StaffdeskError::Agent(e.to_string()))?
                    .into(),
            );
        }

        for turn in history {
            match turn.role.as_str() {
                ROLE_HUMAN => messages.push(user_message(&turn.content)?),
                ROLE_AI => messages.push(
                    ChatCompletionRequestAssistantMessageArgs::default()
                        .content(turn.content.clone())
                        .build()
                        .map_err(|e| StaffdeskError::Agent(e.to_string()))?
                        .into(),
                ),
                other => debug!("Skipping history entry with role '{}'", other),
            }
        }

        messages.push(user_message(input)?);
        Ok(messages)
    }

    /// Execute a single tool call and return a record of it.
    async fn execute_tool_call(&self, tool_call: &ChatCompletionMessageToolCall) -> ToolCallRecord {
        let name = &tool_call.function.name;
        let arguments = &tool_call.function.arguments;

        info!("Agent calling tool: {} with args: {}", name, arguments);

        let output = self.tools.execute(name, arguments).await;

        ToolCallRecord {
            name: name.clone(),
            arguments: arguments.clone(),
            result: output.text,
            return_direct: output.return_direct,
        }
    }
}

fn user_message(content: &str) -> Result<ChatCompletionRequestMessage> {
    Ok(ChatCompletionRequestUserMessageArgs::default()
        .content(content.to_string())
        .build()
        .map_err(|e| StaffdeskError::Agent(e.to_string()))?
        .into())
}

#[async_trait]
impl ChatAgent for Agent {
    async fn respond(&self, input: &str, history: &[ChatMessage]) -> Result<String> {
        let response = self.run(input, history).await?;
        debug!(
            "Agent finished in {} iteration(s) with {} tool call(s)",
            response.iterations,
            response.tool_calls.len()
        );
        Ok(response.content)
    }
}

/// Response from an agent run.
#[derive(Debug)]
pub struct AgentResponse {
    /// The final response content from the agent.
    pub content: String,
    /// Record of all tool calls made during execution.
    pub tool_calls: Vec<ToolCallRecord>,
    /// Number of iterations (LLM calls) used.
    pub iterations: usize,
}

/// Record of a tool call made by the agent.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    /// Name of the tool called.
    pub name: String,
    /// JSON arguments passed to the tool.
    pub arguments: String,
    /// Result returned by the tool.
    pub result: String,
    pub return_direct: bool,
}

impl std::fmt::Display for ToolCallRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name, self.arguments)
    }
}
