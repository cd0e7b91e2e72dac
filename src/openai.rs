//! OpenAI-compatible client configuration.
//!
//! Both the chat model and the embedding model are reached through the
//! OpenAI wire protocol; only the base URL and key differ per provider.

use crate::error::{Result, StaffdeskError};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Default timeout for API requests (5 minutes).
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Create a client for the given endpoint with the default timeout.
pub fn create_client(api_base: &str, api_key: Option<&str>) -> Result<Client<OpenAIConfig>> {
    create_client_with_timeout(api_base, api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
}

/// Create a client for the given endpoint with a custom timeout.
pub fn create_client_with_timeout(
    api_base: &str,
    api_key: Option<&str>,
    timeout: Duration,
) -> Result<Client<OpenAIConfig>> {
    let http_client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| StaffdeskError::Config(format!("Failed to create HTTP client: {}", e)))?;

    let mut config = OpenAIConfig::new().with_api_base(api_base.trim_end_matches('/'));
    if let Some(key) = api_key {
        config = config.with_api_key(key);
    }

    Ok(Client::with_config(config).with_http_client(http_client))
}
