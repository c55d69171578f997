//! wellscope - well-log dashboard session client
//!
#![doc = "Main entry point for the wellscope CLI."]

use anyhow::Result;
use std::sync::Arc;

use wellscope::api::HttpWellApi;
use wellscope::cli::{Cli, DEFAULT_CONFIG_PATH};
use wellscope::commands;
use wellscope::config::{Config, StorageConfig};
use wellscope::dashboard::Dashboard;
use wellscope::logging::init_logging;
use wellscope::storage::{KeyValueStore, MemoryStore, SledStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let cli = Cli::parse_args();

    init_logging(cli.verbose, cli.json_logs)?;

    // Load configuration
    let config_path = cli.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let config = Config::load(config_path, &cli)?;

    // Validate configuration
    config.validate()?;

    let api = Arc::new(HttpWellApi::new(&config.api)?);
    let store = open_store(&config.storage);

    let mut dashboard = Dashboard::open(api, store, &config.chat);
    let outcome = dashboard.start().await;
    tracing::info!(?outcome, "Session ready");

    commands::execute(&mut dashboard, cli.command).await
}

/// Open the on-disk session store, falling back to memory when it is unavailable
fn open_store(config: &StorageConfig) -> Arc<dyn KeyValueStore> {
    let opened = config
        .resolve_path()
        .and_then(|path| SledStore::open(&path, config.quota_bytes));
    match opened {
        Ok(store) => Arc::new(store),
        Err(e) => {
            tracing::warn!("Session store unavailable, this run will not be saved: {}", e);
            Arc::new(MemoryStore::new(config.quota_bytes))
        }
    }
}
