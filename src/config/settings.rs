//! Configuration settings for staffdesk.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub server: ServerSettings,
    pub database: DatabaseSettings,
    pub llm: LlmSettings,
    pub embedding: EmbeddingSettings,
    pub docs: DocsSettings,
    pub agents: AgentSettings,
    pub auth: AuthSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for storing application data.
    pub data_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.staffdesk".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Relational database backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    #[default]
    Sqlite,
    Mysql,
}

impl std::str::FromStr for DatabaseBackend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" => Ok(DatabaseBackend::Sqlite),
            "mysql" | "mariadb" => Ok(DatabaseBackend::Mysql),
            _ => Err(format!("Unknown database backend: {}", s)),
        }
    }
}

impl std::fmt::Display for DatabaseBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseBackend::Sqlite => write!(f, "sqlite"),
            DatabaseBackend::Mysql => write!(f, "mysql"),
        }
    }
}

/// Relational database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// Backend used when `url` is not set.
    pub backend: DatabaseBackend,
    /// Path to the SQLite database file (sqlite backend).
    pub sqlite_path: String,
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub name: String,
    /// Full connection URL; overrides every other connection field.
    pub url: Option<String>,
    /// Maximum number of pooled connections.
    pub pool_size: u32,
    /// Connection attempts made at startup before giving up.
    pub connect_retries: u32,
    /// Delay between startup connection attempts.
    pub retry_delay_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            backend: DatabaseBackend::Sqlite,
            sqlite_path: "~/.staffdesk/staffdesk.db".to_string(),
            host: "localhost".to_string(),
            port: 3306,
            user: "staffdesk".to_string(),
            password: String::new(),
            name: "staffdesk".to_string(),
            url: None,
            pool_size: 5,
            connect_retries: 10,
            retry_delay_secs: 3,
        }
    }
}

impl DatabaseSettings {
    /// Build the connection URL for the configured backend.
    pub fn connection_url(&self) -> crate::error::Result<String> {
        if let Some(url) = self.url.as_ref().filter(|u| !u.is_empty()) {
            return Ok(url.clone());
        }

        match self.backend {
            DatabaseBackend::Sqlite => Ok(format!(
                "sqlite://{}?mode=rwc",
                Settings::expand_path(&self.sqlite_path).display()
            )),
            DatabaseBackend::Mysql => {
                let invalid = |what: &str| {
                    crate::error::StaffdeskError::Config(format!("Invalid database {}", what))
                };
                let mut url = Url::parse("mysql://localhost")
                    .map_err(|e| crate::error::StaffdeskError::Config(e.to_string()))?;
                url.set_host(Some(&self.host))
                    .map_err(|e| crate::error::StaffdeskError::Config(e.to_string()))?;
                url.set_port(Some(self.port)).map_err(|_| invalid("port"))?;
                url.set_username(&self.user).map_err(|_| invalid("user"))?;
                if !self.password.is_empty() {
                    url.set_password(Some(&self.password))
                        .map_err(|_| invalid("password"))?;
                }
                url.set_path(&self.name);
                Ok(url.to_string())
            }
        }
    }

    /// Connection URL with the password masked, for logs and diagnostics.
    pub fn display_url(&self) -> String {
        match self.connection_url() {
            Ok(raw) => match Url::parse(&raw) {
                Ok(mut url) if url.password().is_some() => {
                    let _ = url.set_password(Some("****"));
                    url.to_string()
                }
                _ => raw,
            },
            Err(e) => format!("<invalid: {}>", e),
        }
    }
}

/// Chat-completions provider settings (any OpenAI-compatible endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Base URL of the OpenAI-compatible API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Model used by the agents.
    pub model: String,
    pub temperature: f32,
    /// HTTP timeout for a single completion request.
    pub timeout_secs: u64,
    /// Maximum model calls per agent turn.
    pub max_iterations: usize,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.groq.com/openai/v1".to_string(),
            api_key_env: "GROQ_API_KEY".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.0,
            timeout_secs: 300,
            max_iterations: 15,
        }
    }
}

impl LlmSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Embedding generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    /// Base URL of the OpenAI-compatible embeddings API.
    pub api_base: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Embedding model to use.
    pub model: String,
    /// Embedding dimensions.
    pub dimensions: u32,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
        }
    }
}

impl EmbeddingSettings {
    /// Read the API key from the configured environment variable.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|k| !k.is_empty())
    }
}

/// Document Q&A settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocsSettings {
    /// Build the document index at startup.
    pub enabled: bool,
    /// Directory with the text documents to index.
    pub data_dir: String,
    /// Target chunk size in characters.
    pub chunk_chars: usize,
    /// Characters carried over from the previous chunk.
    pub chunk_overlap: usize,
    /// Maximum number of chunks handed to the model.
    pub max_context_chunks: usize,
    /// Minimum cosine similarity for a chunk to be used.
    pub min_score: f32,
    /// Model override for answers (defaults to `llm.model`).
    pub model: Option<String>,
}

impl Default for DocsSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            data_dir: "data".to_string(),
            chunk_chars: 1200,
            chunk_overlap: 200,
            max_context_chunks: 5,
            min_score: 0.3,
            model: None,
        }
    }
}

/// What the employee agent is allowed to do.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeAccess {
    /// Search and retrieval only; mutations are refused.
    #[default]
    ReadOnly,
    /// Search, retrieval, add, update and delete.
    ReadWrite,
}

/// Agent behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AgentSettings {
    pub employee_access: EmployeeAccess,
}

/// Bearer-token authorization for the document Q&A endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub enabled: bool,
    /// Keycloak base URL, e.g. `https://sso.example.com`.
    pub server_url: String,
    pub realm: String,
    pub client_id: String,
    /// Realm role a caller must hold.
    pub required_role: String,
    /// Require `aud` to contain `client_id`.
    pub verify_audience: bool,
    /// Validate HS256 tokens with this secret instead of the realm keys.
    pub hs256_secret: Option<String>,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            server_url: "http://localhost:8080".to_string(),
            realm: "staffdesk".to_string(),
            client_id: "staffdesk-api".to_string(),
            required_role: "app-user".to_string(),
            verify_audience: false,
            hs256_secret: None,
        }
    }
}

impl AuthSettings {
    /// Issuer claim expected in realm tokens.
    pub fn issuer(&self) -> String {
        format!("{}/realms/{}", self.server_url.trim_end_matches('/'), self.realm)
    }

    /// URL of the realm's published signing keys.
    pub fn jwks_url(&self) -> String {
        format!("{}/protocol/openid-connect/certs", self.issuer())
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    ///
    /// Environment overrides are applied on top of the file.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        let mut settings = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Settings::default()
        };

        settings.apply_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Apply environment overrides using the given lookup.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = get("DATABASE_URL") {
            self.database.url = Some(url);
        }
        if let Some(host) = get("DB_HOST") {
            self.database.backend = DatabaseBackend::Mysql;
            self.database.host = host;
        }
        if let Some(port) = get("DB_PORT").and_then(|p| p.parse().ok()) {
            self.database.port = port;
        }
        if let Some(user) = get("DB_USER") {
            self.database.user = user;
        }
        if let Some(password) = get("DB_PASSWORD") {
            self.database.password = password;
        }
        if let Some(name) = get("DB_NAME") {
            self.database.name = name;
        }

        if let Some(server_url) = get("KEYCLOAK_SERVER_URL") {
            self.auth.enabled = true;
            self.auth.server_url = server_url;
        }
        if let Some(realm) = get("KEYCLOAK_REALM") {
            self.auth.enabled = true;
            self.auth.realm = realm;
        }
        if let Some(client_id) = get("KEYCLOAK_CLIENT_ID") {
            self.auth.enabled = true;
            self.auth.client_id = client_id;
        }

        if let Some(dir) = get("STAFFDESK_DOCS_DIR") {
            self.docs.data_dir = dir;
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::StaffdeskError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Copy of the settings safe to print.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.database.password.is_empty() {
            copy.database.password = "********".to_string();
        }
        if copy.database.url.is_some() {
            copy.database.url = Some(copy.database.display_url());
        }
        if copy.auth.hs256_secret.is_some() {
            copy.auth.hs256_secret = Some("********".to_string());
        }
        copy
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("staffdesk")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded documents directory path.
    pub fn docs_dir(&self) -> PathBuf {
        Self::expand_path(&self.docs.data_dir)
    }
}
