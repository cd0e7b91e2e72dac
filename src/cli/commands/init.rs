//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use console::style;
use std::io::{self, Write};
use std::path::Path;

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("staffdesk Setup");
    println!();
    println!("Welcome to staffdesk! Let's make sure everything is configured correctly.\n");

    // Step 1: API keys
    println!("{}", style("Step 1: Checking API configuration").bold().cyan());
    println!();

    let keys = [
        (&settings.llm.api_key_env, "the chat agents"),
        (&settings.embedding.api_key_env, "document embeddings"),
    ];
    let mut missing = false;
    for (var, purpose) in keys {
        if std::env::var(var).map(|k| k.is_empty()).unwrap_or(true) {
            Output::warning(&format!("{} is not set (needed for {}).", var, purpose));
            println!("  {}", style(format!("export {}='...'", var)).green());
            missing = true;
        } else {
            Output::success(&format!("{} is configured!", var));
        }
    }

    if missing {
        println!();
        println!("  Keys can also be placed in a {} file in the working directory.", style(".env").bold());
        println!();
        if !prompt_continue("Continue without all API keys?")? {
            println!();
            Output::info("Setup cancelled. Set your API keys and run 'staffdesk init' again.");
            return Ok(());
        }
    }

    println!();

    // Step 2: Directories
    println!("{}", style("Step 2: Setting up directories").bold().cyan());
    println!();

    for (label, dir) in [("Data", settings.data_dir()), ("Documents", settings.docs_dir())] {
        if dir.exists() {
            Output::info(&format!("{} directory exists: {}", label, dir.display()));
        } else {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!("Created {} directory: {}", label.to_lowercase(), dir.display()));
        }
    }

    println!();

    // Step 3: Config file
    println!("{}", style("Step 3: Configuration file").bold().cyan());
    println!();

    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path.to_path_buf())?;
        Output::success(&format!("Created config file: {}", config_path.display()));
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("staffdesk doctor").cyan());
    println!("  {} Start the HTTP API", style("staffdesk serve").cyan());
    println!("  {} Talk to the employee agent", style("staffdesk chat --agent employees").cyan());
    println!("  {} Ask about your documents", style("staffdesk ask \"<question>\"").cyan());
    println!();
    println!("For more help: {}", style("staffdesk --help").cyan());

    Ok(())
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(is_yes(&input))
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_yes() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("nope"));
    }
}
