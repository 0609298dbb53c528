//! Paysec main entry point

use anyhow::Context;
use clap::Parser;
use paysec_api::start_server;
use paysec_config::{Config, ConfigError};
use paysec_core::{Bank, ReferenceLoader};
use std::path::PathBuf;
use tokio::runtime::Runtime;

#[derive(Parser, Debug)]
#[command(name = "paysec")]
#[command(version = "0.1.0")]
#[command(about = "Banking API for customer payments and employee verification", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,

    /// Print a default configuration file and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    if args.print_default_config {
        print!("{}", Config::generate_default());
        return Ok(());
    }

    dotenv::dotenv().ok();

    let config = match load_config(args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e.to_details());
            std::process::exit(1);
        }
    };
    init_logging(&config);

    let rt = Runtime::new()?;
    rt.block_on(async {
        let reference = ReferenceLoader::from_config(&config.reference)
            .load()
            .await
            .context("failed to load reference data")?;
        log::info!(
            "Reference data loaded: {} currencies, {} providers",
            reference.currencies.len(),
            reference.providers.len()
        );

        let bank = Bank::in_memory(&config, reference)?;
        start_server(config, bank).await
    })
}

/// Read the config file, or fall back to defaults plus environment when it is absent
fn load_config(path: PathBuf) -> Result<Config, ConfigError> {
    match Config::load(path) {
        Err(ConfigError::FileNotFound { path }) => {
            eprintln!("[WARN] {} not found, using defaults and environment", path);
            let mut config = Config::default();
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config.validate()?;
            Ok(config)
        }
        other => other,
    }
}

/// RUST_LOG wins over the configured level
fn init_logging(config: &Config) {
    let mut builder = env_logger::Builder::new();
    match std::env::var("RUST_LOG") {
        Ok(filter) => builder.parse_filters(&filter),
        Err(_) => builder.parse_filters(&config.logging.level),
    };
    builder.init();
}
