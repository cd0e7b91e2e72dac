//! CLI module for staffdesk.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand, ValueEnum};

/// staffdesk - conversational HR back office
///
/// Chat agents over users and employee records, plus question answering
/// over the organization's documents.
#[derive(Parser, Debug)]
#[command(name = "staffdesk")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and a default configuration file
    Init,

    /// Check API keys, database connectivity and configuration
    Doctor,

    /// Start the HTTP API server
    Serve {
        /// Host to bind to (defaults to server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (defaults to server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Start an interactive chat session with an agent
    Chat {
        /// Which agent to talk to
        #[arg(short, long, value_enum, default_value_t = AgentKind::Users)]
        agent: AgentKind,
    },

    /// Ask a question about the indexed documents
    Ask {
        /// The question to ask
        question: String,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Agents reachable from the CLI.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    /// User management
    Users,
    /// Employee records
    Employees,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration (secrets redacted)
    Show,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_agent() {
        let cli = Cli::parse_from(["staffdesk", "chat", "--agent", "employees"]);
        match cli.command {
            Commands::Chat { agent } => assert_eq!(agent, AgentKind::Employees),
            other => panic!("unexpected command {:?}", other),
        }

        let cli = Cli::parse_from(["staffdesk", "-vv", "chat"]);
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Commands::Chat { agent: AgentKind::Users }));
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::parse_from(["staffdesk", "serve", "--port", "9000"]);
        match cli.command {
            Commands::Serve { host, port } => {
                assert!(host.is_none());
                assert_eq!(port, Some(9000));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }
}
