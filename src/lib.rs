//! staffdesk - conversational HR back office
//!
//! Natural-language agents over a small relational store of users and
//! employee records, served over HTTP, plus question answering over a
//! directory of text documents.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `db` - Connection pool and schema
//! - `models` - Records and request/response bodies
//! - `repository` - Parameterized data access
//! - `tools` - Tool sets exposed to the agents
//! - `agent` - Tool-calling loop over an OpenAI-compatible model
//! - `chunking`, `embedding`, `vector_store`, `docs`, `rag` - Document Q&A
//! - `api` - HTTP routes and bearer-token authorization
//!
//! # Example
//!
//! ```rust,no_run
//! use staffdesk::config::Settings;
//! use staffdesk::db::Database;
//! use staffdesk::repository::EmployeeRepository;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let db = Database::connect_with_retries(&settings.database).await?;
//!     db.initialize().await?;
//!
//!     let active = EmployeeRepository::new(&db).list_active().await?;
//!     println!("{} active employees", active.len());
//!
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod api;
pub mod chunking;
pub mod cli;
pub mod config;
pub mod db;
pub mod docs;
pub mod embedding;
pub mod error;
pub mod models;
pub mod openai;
pub mod rag;
pub mod repository;
pub mod tools;
pub mod vector_store;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Result, StaffdeskError};
