//! Interactive chat with one of the agents.

use crate::agent::{employee_agent, user_agent, Agent};
use crate::cli::preflight::{self, Operation};
use crate::cli::{AgentKind, Output};
use crate::config::{Prompts, Settings};
use crate::db::Database;
use crate::error::Result;
use crate::models::{ChatMessage, ChatResponse};
use console::style;
use std::io::{self, BufRead, Write};

/// Turns kept in the local history.
const MAX_HISTORY: usize = 40;

/// Run the interactive chat command.
pub async fn run_chat(kind: AgentKind, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Chat, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'staffdesk doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;

    let db = Database::connect_with_retries(&settings.database).await?;
    db.initialize().await?;

    let (agent, label) = match kind {
        AgentKind::Users => (user_agent(&settings, &prompts, &db)?, "Users"),
        AgentKind::Employees => (employee_agent(&settings, &prompts, &db)?, "Employees"),
    };

    let mut session = ChatSession::new(agent);

    println!("\n{}", style(format!("staffdesk chat ({})", label)).bold().cyan());
    println!(
        "{}\n",
        style("Type your requests, or 'exit' to quit. Use 'clear' to reset conversation.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear_history();
            Output::info("Conversation history cleared.");
            continue;
        }

        let spinner = Output::spinner("Thinking...");
        let result = session.send(input).await;
        spinner.finish_and_clear();

        match result {
            Ok(answer) => Output::reply(label, &answer),
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    db.close().await;
    Ok(())
}

/// Local conversation: the same history contract as the HTTP endpoints.
struct ChatSession {
    agent: Agent,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    fn new(agent: Agent) -> Self {
        Self {
            agent,
            history: Vec::new(),
        }
    }

    fn clear_history(&mut self) {
        self.history.clear();
    }

    async fn send(&mut self, input: &str) -> Result<String> {
        let response = self.agent.run(input, &self.history).await?;

        for call in &response.tool_calls {
            println!("{}", style(format!("  [{}]", call.name)).dim());
        }

        let turn = ChatResponse::from_turn(
            std::mem::take(&mut self.history),
            input,
            response.content,
        );
        self.history = turn.chat_history;
        if self.history.len() > MAX_HISTORY {
            self.history.drain(..self.history.len() - MAX_HISTORY);
        }

        Ok(turn.agent_output)
    }
}
