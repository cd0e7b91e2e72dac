//! Tools for the user-management agent.

use super::{error_text, function_tool, no_arguments, parse_call, ToolOutput, Toolset};
use crate::error::{Result, StaffdeskError};
use crate::models::UserUpdate;
use crate::repository::UserRepository;
use async_openai::types::ChatCompletionTool;
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

const GREETING: &str =
    "Hello! I am a database management assistant. I can add, update, delete, find, and list users.";

/// Calls understood by [`UserTools`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum UserToolCall {
    ListAllUsers,
    GetUserDetails {
        name: String,
    },
    AddNewUser {
        name: String,
        email: String,
    },
    UpdateUserDetails {
        name: String,
        #[serde(default)]
        new_name: Option<String>,
        #[serde(default)]
        new_email: Option<String>,
    },
    DeleteUser {
        name: String,
    },
    GreetUser,
}

/// User-management toolset.
pub struct UserTools {
    repo: UserRepository,
}

impl UserTools {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    async fn run(&self, call: UserToolCall) -> Result<ToolOutput> {
        let text = match call {
            UserToolCall::ListAllUsers => {
                let users = self.repo.list_all().await?;
                if users.is_empty() {
                    "There are no users in the database.".to_string()
                } else {
                    users
                        .iter()
                        .map(|u| format!("- {} ({})", u.name, u.email))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            UserToolCall::GetUserDetails { name } => match self.repo.get_by_name(&name).await? {
                Some(user) => format!("User Details: Name={}, Email={}", user.name, user.email),
                None => format!("No user found with the name '{}'.", name),
            },
            UserToolCall::AddNewUser { name, email } => match self.repo.add(&name, &email).await {
                Ok(()) => format!("User '{}' was successfully added.", name),
                Err(StaffdeskError::Constraint(_)) => {
                    format!("Error: A user with the email '{}' already exists.", email)
                }
                Err(e) => return Err(e),
            },
            UserToolCall::UpdateUserDetails {
                name,
                new_name,
                new_email,
            } => {
                let changes = UserUpdate {
                    new_name,
                    new_email: new_email.clone(),
                };
                match self.repo.update(&name, &changes).await {
                    Ok(0) => format!("Error: No user found with the name '{}' to update.", name),
                    Ok(_) => format!("Successfully updated user '{}'.", name),
                    Err(StaffdeskError::Constraint(_)) => format!(
                        "Error: The new email '{}' is already in use.",
                        new_email.unwrap_or_default()
                    ),
                    Err(e) => return Err(e),
                }
            }
            UserToolCall::DeleteUser { name } => match self.repo.delete(&name).await? {
                0 => format!("Error: No user found with the name '{}' to delete.", name),
                _ => format!("User '{}' has been successfully deleted.", name),
            },
            UserToolCall::GreetUser => return Ok(ToolOutput::direct(GREETING)),
        };

        Ok(ToolOutput::text(text))
    }
}

#[async_trait]
impl Toolset for UserTools {
    fn definitions(&self) -> Vec<ChatCompletionTool> {
        let name_only = |description: &str| {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string", "description": description }
                },
                "required": ["name"]
            })
        };

        vec![
            function_tool(
                "list_all_users",
                "Lists all users currently in the database.",
                no_arguments(),
            ),
            function_tool(
                "get_user_details",
                "Finds a specific user by their name.",
                name_only("The exact name of the user to look up"),
            ),
            function_tool(
                "add_new_user",
                "Adds a new user to the database.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Full name of the new user" },
                        "email": { "type": "string", "description": "Email address of the new user" }
                    },
                    "required": ["name", "email"]
                }),
            ),
            function_tool(
                "update_user_details",
                "Modifies the details of an existing user. Provide a new name, a new email, or both.",
                serde_json::json!({
                    "type": "object",
                    "properties": {
                        "name": { "type": "string", "description": "Current name of the user to update" },
                        "new_name": { "type": "string", "description": "The new name for the user" },
                        "new_email": { "type": "string", "description": "The new email for the user" }
                    },
                    "required": ["name"]
                }),
            ),
            function_tool(
                "delete_user",
                "Permanently deletes an existing user.",
                name_only("The name of the user to delete"),
            ),
            function_tool(
                "greet_user",
                "Provides a greeting and explains the agent's capabilities.",
                no_arguments(),
            ),
        ]
    }

    async fn execute(&self, name: &str, arguments: &str) -> ToolOutput {
        info!("User tool: {} {}", name, arguments);

        let result = if self.has_tool(name) {
            match parse_call::<UserToolCall>(name, arguments) {
                Ok(call) => self.run(call).await,
                Err(e) => Err(e),
            }
        } else {
            Err(StaffdeskError::Agent(format!("Unknown tool '{}'", name)))
        };

        result.unwrap_or_else(|e| ToolOutput::text(error_text(&e)))
    }
}
