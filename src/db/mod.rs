//! Connection pool and schema management.
//!
//! One pool type serves both SQLite and MySQL through the sqlx `Any` driver.
//! Statements use `?` placeholders, which both backends accept.

mod schema;

use crate::config::{DatabaseBackend, DatabaseSettings, Settings};
use crate::error::{Result, StaffdeskError};
use sqlx::any::AnyPoolOptions;
use sqlx::AnyPool;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Shared handle to the relational store.
#[derive(Clone, Debug)]
pub struct Database {
    pool: AnyPool,
    backend: DatabaseBackend,
}

impl Database {
    /// Open a pool for `url` without retrying.
    pub async fn connect(url: &str, pool_size: u32) -> Result<Self> {
        sqlx::any::install_default_drivers();

        let backend = backend_for_url(url)?;
        let pool = AnyPoolOptions::new()
            .max_connections(pool_size.max(1))
            .connect(url)
            .await?;

        Ok(Self { pool, backend })
    }

    /// Open the configured pool, retrying while the server is unreachable.
    ///
    /// Gives up after `connect_retries` attempts spaced `retry_delay_secs` apart.
    pub async fn connect_with_retries(settings: &DatabaseSettings) -> Result<Self> {
        let url = settings.connection_url()?;
        if settings.url.is_none() && matches!(settings.backend, DatabaseBackend::Sqlite) {
            if let Some(parent) = Settings::expand_path(&settings.sqlite_path).parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let attempts = settings.connect_retries.max(1);
        let delay = Duration::from_secs(settings.retry_delay_secs);

        let mut attempt = 1;
        loop {
            info!(
                "Database connection attempt {}/{} ({})",
                attempt,
                attempts,
                settings.display_url()
            );
            match Self::connect(&url, settings.pool_size).await {
                Ok(db) => {
                    info!("Database connection pool initialized ({} connections)", settings.pool_size);
                    return Ok(db);
                }
                Err(e) if attempt < attempts => {
                    warn!("Connection failed: {}. Retrying in {}s", e, delay.as_secs());
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    return Err(StaffdeskError::Database(format!(
                        "Could not connect to the database after {} attempts: {}",
                        attempts, e
                    )));
                }
            }
        }
    }

    /// Fresh private in-memory SQLite store with tables and seed row.
    pub async fn in_memory() -> Result<Self> {
        sqlx::any::install_default_drivers();

        // A single connection that never recycles keeps the memory database alive.
        let pool = AnyPoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await?;

        let db = Self {
            pool,
            backend: DatabaseBackend::Sqlite,
        };
        db.initialize().await?;
        Ok(db)
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn backend(&self) -> DatabaseBackend {
        self.backend
    }

    /// Create tables and seed the default agent.
    pub async fn initialize(&self) -> Result<()> {
        self.create_tables().await?;
        self.seed().await
    }

    /// Create `users`, `agents` and `employees` if they do not exist.
    pub async fn create_tables(&self) -> Result<()> {
        for (table, ddl) in schema::tables(self.backend) {
            debug!("Ensuring table '{}'", table);
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        info!("Tables are ready");
        Ok(())
    }

    /// Insert the default agent row (id=1) once.
    pub async fn seed(&self) -> Result<()> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM agents WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;

        if count == 0 {
            sqlx::query("INSERT INTO agents (id, name, description) VALUES (1, ?, ?)")
                .bind(schema::DEFAULT_AGENT_NAME)
                .bind(schema::DEFAULT_AGENT_DESCRIPTION)
                .execute(&self.pool)
                .await?;
            info!("Seeded default agent (id=1)");
        }

        Ok(())
    }

    /// Cheap round-trip used by health checks.
    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn backend_for_url(url: &str) -> Result<DatabaseBackend> {
    if url.starts_with("sqlite:") {
        Ok(DatabaseBackend::Sqlite)
    } else if url.starts_with("mysql:") || url.starts_with("mariadb:") {
        Ok(DatabaseBackend::Mysql)
    } else {
        Err(StaffdeskError::Config(format!(
            "Unsupported database URL scheme: {}",
            url.split(':').next().unwrap_or_default()
        )))
    }
}
