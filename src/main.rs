//! Salesdash main entry point

use clap::Parser;
use salesdash_api::start_server;
use salesdash_config::{Config, ConfigError};
use salesdash_core::{AuthService, MemoryStore, StoreRef, TableData};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "salesdash")]
#[command(author = "Salesdash Contributors")]
#[command(version = "0.1.0")]
#[command(about = "A lightweight sales-management dashboard service", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = Args::parse();
    let rt = Runtime::new()?;

    rt.block_on(async {
        let config = match Config::load(args.config.clone()) {
            Ok(config) => config,
            Err(ConfigError::FileNotFound { path }) => {
                log::warn!("Config file not found ({}), using defaults", path);
                Config::default()
            }
            Err(e) => return Err(e.into()),
        };

        log::info!(
            "Config loaded: seed file={}, port={}",
            config.seed_path().display(),
            config.server.port
        );

        let store: StoreRef = Arc::new(load_store(&config));
        let auth = Arc::new(AuthService::new(store.clone()));

        start_server(config, store, auth).await
    })
}

/// Build the store, seeded from the configured YAML table dump when it
/// exists, empty otherwise
fn load_store(config: &Config) -> MemoryStore {
    let seed_path = config.seed_path();
    if !seed_path.exists() {
        log::warn!("Seed file not found: {}", seed_path.display());
        return MemoryStore::new();
    }

    match std::fs::read_to_string(&seed_path) {
        Ok(content) => match serde_yaml::from_str::<TableData>(&content) {
            Ok(data) => {
                log::info!("Seed data loaded from {}", seed_path.display());
                MemoryStore::with_data(data)
            }
            Err(e) => {
                log::error!("Failed to parse seed data: {}", e);
                MemoryStore::new()
            }
        },
        Err(e) => {
            log::error!("Failed to read seed file: {}", e);
            MemoryStore::new()
        }
    }
}
