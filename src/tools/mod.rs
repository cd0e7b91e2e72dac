//! Tools the chat agents can call.
//!
//! A tool takes JSON arguments matching its declared schema, runs exactly
//! one repository operation and answers with plain text. Failures are
//! rendered as text too, so the model can explain them to the user.

mod employee;
pub mod format;
mod user;

pub use employee::{EmployeeToolCall, EmployeeTools};
pub use user::{UserToolCall, UserTools};

use crate::error::{Result, StaffdeskError};
use async_openai::types::{ChatCompletionTool, ChatCompletionToolType, FunctionObject};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

/// Text produced by a tool invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    /// When set, the text is the final answer and the model is not consulted again.
    pub return_direct: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            return_direct: false,
        }
    }

    pub fn direct(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            return_direct: true,
        }
    }
}

/// A fixed set of tools offered to the model.
#[async_trait]
pub trait Toolset: Send + Sync {
    /// Schemas sent with every completion request.
    fn definitions(&self) -> Vec<ChatCompletionTool>;

    /// Run the named tool. Never fails: errors come back as text.
    async fn execute(&self, name: &str, arguments: &str) -> ToolOutput;

    /// Whether `name` is one of this toolset's tools.
    fn has_tool(&self, name: &str) -> bool {
        self.definitions().iter().any(|t| t.function.name == name)
    }
}

/// Build a function tool definition.
pub(crate) fn function_tool(
    name: &str,
    description: &str,
    parameters: serde_json::Value,
) -> ChatCompletionTool {
    ChatCompletionTool {
        r#type: ChatCompletionToolType::Function,
        function: FunctionObject {
            name: name.to_string(),
            description: Some(description.to_string()),
            parameters: Some(parameters),
            strict: None,
        },
    }
}

/// Schema for a tool without arguments.
pub(crate) fn no_arguments() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {}
    })
}

/// Decode a call into a `tool`-tagged enum.
///
/// The tool name is merged into the argument object under `tool`, so each
/// enum variant declares its arguments as ordinary fields.
pub(crate) fn parse_call<T: DeserializeOwned>(name: &str, arguments: &str) -> Result<T> {
    let mut args: serde_json::Value = if arguments.trim().is_empty() {
        serde_json::json!({})
    } else {
        serde_json::from_str(arguments)
            .map_err(|e| StaffdeskError::Agent(format!("Invalid tool arguments: {}", e)))?
    };

    if args.is_null() {
        args = serde_json::json!({});
    }

    let object = args
        .as_object_mut()
        .ok_or_else(|| StaffdeskError::Agent("Tool arguments must be a JSON object".to_string()))?;
    object.insert(
        "tool".to_string(),
        serde_json::Value::String(name.to_string()),
    );

    serde_json::from_value(args)
        .map_err(|e| StaffdeskError::Agent(format!("Invalid arguments for '{}': {}", name, e)))
}

/// Render a tool failure for the model.
pub(crate) fn error_text(err: &StaffdeskError) -> String {
    match err {
        StaffdeskError::InvalidInput(msg) | StaffdeskError::Agent(msg) => format!("Error: {}", msg),
        StaffdeskError::NotFound(msg) => msg.clone(),
        other => format!("Error: {}", other),
    }
}
