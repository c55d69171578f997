//! wellscope - session core for a well-log analysis dashboard
//!
//! This library keeps one dashboard session consistent against a well-log
//! backend and persists it locally so the next start picks up where the
//! last one left off.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `api`: Backend wire types, the `WellApi` trait and its reqwest client
//! - `storage`: Best-effort JSON persistence over a quota-bounded store
//! - `session`: Selection, well session controller, restoration, activity log, toasts
//! - `chat`: Per-well chat bound to the dashboard context
//! - `dashboard`: The application shell wiring everything together
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wellscope::api::HttpWellApi;
//! use wellscope::storage::MemoryStore;
//! use wellscope::{Config, Dashboard};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/wellscope.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let api = Arc::new(HttpWellApi::new(&config.api)?);
//!     let store = Arc::new(MemoryStore::new(config.storage.quota_bytes));
//!     let mut dashboard = Dashboard::open(api, store, &config.chat);
//!     dashboard.start().await;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod chat;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod logging;
pub mod session;
pub mod storage;

// Re-export commonly used types
pub use api::{HttpWellApi, WellApi};
pub use config::Config;
pub use dashboard::Dashboard;
pub use error::{Result, WellscopeError};
pub use session::WellSessionController;
