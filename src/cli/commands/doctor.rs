//! Doctor command - verify API keys, database and configuration.

use crate::cli::Output;
use crate::config::{DatabaseBackend, Settings};
use crate::db::Database;
use crate::docs::document_files;
use console::style;
use std::path::Path;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings, config_path: &Path) -> anyhow::Result<()> {
    Output::header("staffdesk Doctor");
    println!();
    println!("Checking configuration and connectivity...\n");

    let mut checks = Vec::new();

    let api = vec![
        check_api_key(&settings.llm.api_key_env, std::env::var(&settings.llm.api_key_env).ok(), true),
        check_api_key(
            &settings.embedding.api_key_env,
            std::env::var(&settings.embedding.api_key_env).ok(),
            false,
        ),
    ];
    print_section("API Configuration", &api);
    checks.extend(api);

    let database = vec![check_database(settings).await];
    print_section("Database", &database);
    checks.extend(database);

    let docs = vec![check_docs_dir(settings)];
    print_section("Documents", &docs);
    checks.extend(docs);

    let config = vec![check_config_file(config_path), check_auth(settings)];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using staffdesk.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! staffdesk is ready to use.");
    }

    Ok(())
}

/// Check an API key held in `var`; a missing optional key is only a warning.
fn check_api_key(var: &str, value: Option<String>, required: bool) -> CheckResult {
    let hint = format!("Set with: export {}='...'", var);
    match value {
        Some(key) if key.chars().count() > 12 => {
            let head: String = key.chars().take(4).collect();
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            let masked = format!("{}...{}", head, tail);
            CheckResult::ok(var, &format!("configured ({})", masked))
        }
        Some(key) if !key.is_empty() => CheckResult::warning(var, "set but looks too short", &hint),
        _ if required => CheckResult::error(var, "not set", &hint),
        _ => CheckResult::warning(var, "not set (document Q&A disabled)", &hint),
    }
}

/// Try one connection to the configured database.
async fn check_database(settings: &Settings) -> CheckResult {
    let url = match settings.database.connection_url() {
        Ok(url) => url,
        Err(e) => return CheckResult::error("Database", &e.to_string(), "Check the [database] section"),
    };

    let sqlite_file = matches!(settings.database.backend, DatabaseBackend::Sqlite)
        && settings.database.url.is_none();
    if sqlite_file && !Settings::expand_path(&settings.database.sqlite_path).exists() {
        return CheckResult::warning(
            "Database",
            &format!("{} (not created yet)", settings.database.sqlite_path),
            "It will be created by 'staffdesk serve'",
        );
    }

    let result = match Database::connect(&url, 1).await {
        Ok(db) => {
            let ping = db.ping().await;
            db.close().await;
            ping
        }
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => CheckResult::ok("Database", &settings.database.display_url()),
        Err(e) => CheckResult::error(
            "Database",
            &format!("{} ({})", settings.database.display_url(), e),
            "Check DB_HOST/DB_USER/DB_PASSWORD or DATABASE_URL",
        ),
    }
}

fn check_docs_dir(settings: &Settings) -> CheckResult {
    let dir = settings.docs_dir();
    if !settings.docs.enabled {
        return CheckResult::ok("Documents directory", "document Q&A disabled");
    }
    if !dir.is_dir() {
        return CheckResult::warning(
            "Documents directory",
            &format!("{} not found", dir.display()),
            "Create it and add .txt or .md files to enable document Q&A",
        );
    }

    match document_files(&dir) {
        Ok(files) if files.is_empty() => CheckResult::warning(
            "Documents directory",
            &format!("{} has no .txt or .md files", dir.display()),
            "Add documents to enable document Q&A",
        ),
        Ok(files) => CheckResult::ok(
            "Documents directory",
            &format!("{} ({} files)", dir.display(), files.len()),
        ),
        Err(e) => CheckResult::error(
            "Documents directory",
            &format!("{} unreadable: {}", dir.display(), e),
            "Check directory permissions",
        ),
    }
}

fn check_config_file(config_path: &Path) -> CheckResult {
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: staffdesk init",
        )
    }
}

fn check_auth(settings: &Settings) -> CheckResult {
    if !settings.auth.enabled {
        return CheckResult::warning(
            "Authorization",
            "disabled, /api/v1/doc-qa is open",
            "Set KEYCLOAK_SERVER_URL and KEYCLOAK_REALM to enable",
        );
    }
    match &settings.auth.hs256_secret {
        Some(_) => CheckResult::ok("Authorization", "HS256 shared secret"),
        None => CheckResult::ok("Authorization", &settings.auth.jwks_url()),
    }
}
