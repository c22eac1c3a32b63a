//! # Persisted State Repair
//!
//! Heals the stored state tree in place, the same way app startup would,
//! and reports what had to be repaired.
//!
//! ## Usage
//! ```bash
//! # Repair the configured database
//! cargo run -p casemove-store --bin casemove-repair
//!
//! # Inspect only, write nothing
//! cargo run -p casemove-store --bin casemove-repair -- --dry-run
//!
//! # Explicit database and key
//! cargo run -p casemove-store --bin casemove-repair -- --db ./casemove.db --key root
//! ```

use casemove_store::{Database, DbConfig, Persistor, StoreConfig};
use std::env;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,casemove=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config_path: Option<PathBuf> = None;
    let mut db_path: Option<PathBuf> = None;
    let mut key: Option<String> = None;
    let mut dry_run = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--key" | "-k" => {
                if i + 1 < args.len() {
                    key = Some(args[i + 1].clone());
                    i += 1;
                }
            }
            "--dry-run" | "-n" => dry_run = true,
            "--help" | "-h" => {
                println!("Casemove persisted state repair");
                println!();
                println!("Usage: casemove-repair [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>  Config file (default: platform config dir)");
                println!("  -d, --db <PATH>      Database file, overrides the config");
                println!("  -k, --key <KEY>      Persistence key, overrides the config");
                println!("  -n, --dry-run        Report repairs without writing them");
                println!("  -h, --help           Show this help message");
                return Ok(());
            }
            other => eprintln!("Ignoring unknown argument: {}", other),
        }
        i += 1;
    }

    let mut config = StoreConfig::load(config_path)?;
    if let Some(path) = db_path {
        config.database.path = path;
    }
    if let Some(key) = key {
        config.persist.key = key;
    }
    config.validate()?;

    let db = Database::new(DbConfig::new(config.database_path()).max_connections(1)).await?;
    let repo = db.persisted_state();
    let previous = repo.load_record(config.persist_key()).await?;
    let persistor = Persistor::new(repo, config.persist_key());
    let rehydrated = persistor.rehydrate().await?;

    println!("Database: {}", config.database_path().display());
    println!("Key:      {}", persistor.key());
    match &previous {
        Some(record) => println!("Stored:   version {}, updated {}", record.version, record.updated_at),
        None => println!("Stored:   nothing (first run)"),
    }
    println!();

    if rehydrated.report.is_clean() {
        println!("✓ Persisted state is structurally valid");
    } else {
        println!("⚠ Healed {} location(s):", rehydrated.report.healed.len());
        for healed in &rehydrated.report.healed {
            match healed.field {
                Some(field) => println!("  • {}.{}", healed.slice, field),
                None => println!("  • {} (whole slice)", healed.slice),
            }
        }
    }

    if dry_run {
        println!();
        println!("Dry run, nothing written.");
    } else if rehydrated.found && !rehydrated.report.is_clean() {
        persistor.persist(&rehydrated.state).await?;
        info!(key = %persistor.key(), "Wrote sanitized state back");
        println!();
        println!("✓ Sanitized state written back");
    } else {
        println!();
        println!("Nothing to write.");
    }

    db.close().await;
    Ok(())
}
