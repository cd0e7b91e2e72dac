//! Pre-flight checks before expensive operations.
//!
//! Validates that required API keys are available before starting
//! operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{Result, StaffdeskError};

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Agent chat requires the chat model key.
    Chat,
    /// Document questions require both the chat and embedding keys.
    Ask,
    /// Serving needs the chat key; a missing embedding key only disables doc Q&A.
    Serve,
}

/// Run pre-flight checks for the given operation.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Chat | Operation::Serve => {
            check_api_key(&settings.llm.api_key_env)?;
        }
        Operation::Ask => {
            check_api_key(&settings.llm.api_key_env)?;
            check_api_key(&settings.embedding.api_key_env)?;
        }
    }
    Ok(())
}

/// Check that the named environment variable holds a key.
pub fn check_api_key(var: &str) -> Result<()> {
    check_key_value(var, std::env::var(var).ok())
}

fn check_key_value(var: &str, value: Option<String>) -> Result<()> {
    match value {
        Some(key) if !key.is_empty() => Ok(()),
        Some(_) => Err(StaffdeskError::Config(format!(
            "{} is empty. Set it with: export {}='...'",
            var, var
        ))),
        None => Err(StaffdeskError::Config(format!(
            "{} not set. Set it with: export {}='...'",
            var, var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_checks() {
        assert!(check_key_value("GROQ_API_KEY", Some("gsk-1".to_string())).is_ok());

        let err = check_key_value("GROQ_API_KEY", None).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY not set"));

        let err = check_key_value("GROQ_API_KEY", Some(String::new())).unwrap_err();
        assert!(err.to_string().contains("is empty"));
    }
}
