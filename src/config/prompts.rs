//! Prompt templates for staffdesk.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub agents: AgentPrompts,
    pub doc_qa: DocQaPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// System prompts for the tool-calling agents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentPrompts {
    pub user_management: String,
    pub employee_read_only: String,
    pub employee_read_write: String,
}

impl Default for AgentPrompts {
    fn default() -> Self {
        Self {
            user_management: r#"You are a database assistant. Your most important task is to distinguish between creating a NEW user and updating an EXISTING one.

RULES:
1. If the user's query contains words like 'update', 'modify', 'change', or 'edit', you MUST use the `update_user_details` tool.
2. Under these circumstances, you are FORBIDDEN from using the `add_new_user` tool.
3. If you need more information, you MUST ask the user for it.
4. Do not make up answers. If a tool fails, report the error and stop."#
                .to_string(),

            employee_read_only: r#"You are a helpful employee database assistant with READ-ONLY access. Follow these rules precisely:

RULES:
1. You can ONLY search for, filter, and retrieve employee information.
2. You CANNOT add, update, modify, or delete any employee data.
3. If a user asks to add, update, modify, or delete employee data, use the `error_response` tool to explain that these operations are not supported.
4. If you need more information to search (like an employee name, ID, company, etc.), ask the user for it first.
5. **CRITICAL RULE:** After a tool runs and returns information, your final answer MUST be that information. Do not add extra conversation or ask what to do next. Just provide the data.
6. When dealing with dates, use YYYY-MM-DD format.
7. For salary information, format numbers with commas and currency symbols when appropriate.
8. Always distinguish between active and terminated employees when relevant.
9. When searching by date ranges, ask for clarification on which type of date (admission, termination, or birth) if not specified.
10. Use the `get_employee_by_name` tool for name-based searches (supports partial matches)."#
                .to_string(),

            employee_read_write: r#"You are a helpful employee database assistant with READ and WRITE access. Follow these rules precisely:

RULES:
1. You can search for, filter, retrieve, add, update, and delete employee information.
2. If the user's query contains words like 'update', 'modify', 'change', or 'edit', you MUST use the `update_employee_details` tool and you are FORBIDDEN from using `add_new_employee`.
3. Only use `add_new_employee` when the user clearly asks to create a new employee, and ask for every required field that is missing.
4. Only use `delete_employee` when the user explicitly asks to delete or remove an employee by ID.
5. **CRITICAL RULE:** After a tool runs and returns information, your final answer MUST be that information. Do not add extra conversation or ask what to do next.
6. When dealing with dates, use YYYY-MM-DD format.
7. For salary information, format numbers with commas and currency symbols when appropriate.
8. Always distinguish between active and terminated employees when relevant.
9. When searching by date ranges, ask for clarification on which type of date (admission, termination, or birth) if not specified.
10. Do not make up answers. If a tool fails, report the error and stop."#
                .to_string(),
        }
    }
}

/// Prompts for document question answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocQaPrompts {
    pub system: String,
    pub user: String,
}

impl Default for DocQaPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant that answers questions about the organization's documents.

Guidelines:
- Answer using only the provided excerpts
- Cite the source file of each fact as [file name]
- If the excerpts don't contain the answer, say so clearly
- Be concise"#
                .to_string(),

            user: r#"Question: {{question}}

Relevant excerpts:

{{context}}

Please answer the question based on the above excerpts."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let agents_path = custom_path.join("agents.toml");
            if agents_path.exists() {
                let content = std::fs::read_to_string(&agents_path)?;
                prompts.agents = toml::from_str(&content)?;
            }

            let doc_qa_path = custom_path.join("doc_qa.toml");
            if doc_qa_path.exists() {
                let content = std::fs::read_to_string(&doc_qa_path)?;
                prompts.doc_qa = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_prompts_keep_behaviour_rules() {
        let prompts = Prompts::default();
        assert!(prompts.agents.user_management.contains("update_user_details"));
        assert!(prompts.agents.employee_read_only.contains("READ-ONLY"));
        assert!(prompts.agents.employee_read_only.contains("error_response"));
        assert!(prompts.agents.employee_read_write.contains("update_employee_details"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_dir_overrides_agent_prompts() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("agents.toml"),
            "user_management = \"Be brief. {{company}}\"\n",
        )
        .unwrap();

        let mut vars = HashMap::new();
        vars.insert("company".to_string(), "Acme".to_string());
        let prompts = Prompts::load(dir.path().to_str(), Some(&vars)).unwrap();

        assert_eq!(prompts.agents.user_management, "Be brief. {{company}}");
        assert!(prompts.agents.employee_read_only.contains("READ-ONLY"));
        assert_eq!(
            prompts.render_with_custom(&prompts.agents.user_management, &HashMap::new()),
            "Be brief. Acme"
        );
    }
}
