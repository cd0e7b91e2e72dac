//! Configuration module for staffdesk.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{AgentPrompts, DocQaPrompts, Prompts};
pub use settings::{
    AgentSettings, AuthSettings, DatabaseBackend, DatabaseSettings, DocsSettings,
    EmbeddingSettings, EmployeeAccess, GeneralSettings, LlmSettings, PromptSettings,
    ServerSettings, Settings,
};
