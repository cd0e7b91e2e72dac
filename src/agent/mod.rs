//! Chat agents: a system prompt and a toolset bound to an LLM client.
//!
//! The model decides which tools to call; this module runs the
//! tool-calling loop and threads the caller's history through it.

mod runner;

pub use runner::{Agent, AgentResponse, ChatAgent, ToolCallRecord};

use crate::config::{EmployeeAccess, Prompts, Settings};
use crate::db::Database;
use crate::error::Result;
use crate::openai::create_client_with_timeout;
use crate::repository::{EmployeeRepository, UserRepository};
use crate::tools::{EmployeeTools, Toolset, UserTools};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

fn build(settings: &Settings, tools: Arc<dyn Toolset>, prompt: &str) -> Result<Agent> {
    let api_key = settings.llm.api_key();
    let client = create_client_with_timeout(
        &settings.llm.api_base,
        api_key.as_deref(),
        Duration::from_secs(settings.llm.timeout_secs),
    )?;

    Ok(Agent::new(client, &settings.llm.model, tools)
        .with_system_prompt(prompt)
        .with_max_iterations(settings.llm.max_iterations)
        .with_temperature(settings.llm.temperature))
}

/// Agent that manages the `users` table.
pub fn user_agent(settings: &Settings, prompts: &Prompts, db: &Database) -> Result<Agent> {
    let tools = UserTools::new(UserRepository::new(db));
    let prompt = prompts.render_with_custom(&prompts.agents.user_management, &HashMap::new());
    info!("Built user-management agent ({})", settings.llm.model);
    build(settings, Arc::new(tools), &prompt)
}

/// Agent over the `employees` table, read-only unless configured otherwise.
pub fn employee_agent(settings: &Settings, prompts: &Prompts, db: &Database) -> Result<Agent> {
    let access = settings.agents.employee_access;
    let tools = EmployeeTools::new(EmployeeRepository::new(db), access);
    let template = match access {
        EmployeeAccess::ReadOnly => &prompts.agents.employee_read_only,
        EmployeeAccess::ReadWrite => &prompts.agents.employee_read_write,
    };
    let prompt = prompts.render_with_custom(template, &HashMap::new());
    info!("Built employee agent ({:?}, {})", access, settings.llm.model);
    build(settings, Arc::new(tools), &prompt)
}
