//! Main application entry point (CLI binary).
//!
//! This is a thin wrapper around the `api_hub` library that handles:
//! - Command-line argument parsing
//! - Environment variable loading (.env file)
//! - Logger initialization
//! - The `issue-key` admin command
//!
//! All core functionality is implemented in the library crate.

use anyhow::{Context, Result};
use clap::Parser;
use std::process;

use api_hub::initialization::{init_crypto_provider, init_logger_with};
use api_hub::storage::{init_db_pool_with_path, insert_account};
use api_hub::{run_server, Cli, Command, IssueKeyArgs};

/// Creates an account with a fresh random key and returns the key.
async fn issue_key(args: &IssueKeyArgs) -> Result<String> {
    let pool = init_db_pool_with_path(&args.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", args.db_path.display()))?;
    let mut conn = pool
        .acquire()
        .await
        .context("Failed to acquire a database connection")?;

    let api_key = uuid::Uuid::new_v4().to_string();
    let account = insert_account(&mut conn, &args.email, &api_key)
        .await
        .with_context(|| format!("Failed to create account for {}", args.email))?;
    log::info!("Created account {} for {}", account.id, account.email);
    Ok(account.api_key)
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file (if it exists)
    // Try the current directory first, then the executable's directory
    if dotenvy::dotenv().is_err() {
        if let Ok(exe_path) = std::env::current_exe() {
            if let Some(exe_dir) = exe_path.parent() {
                let env_path = exe_dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                }
            }
        }
    }

    let cli = Cli::parse();

    init_logger_with(cli.log_level.clone().into(), cli.log_format.clone())
        .context("Failed to initialize logger")?;

    // Initialize crypto provider for TLS operations
    init_crypto_provider();

    let result = match cli.command {
        Command::Serve(config) => run_server(config).await,
        Command::IssueKey(args) => issue_key(&args).await.map(|key| {
            println!("{key}");
        }),
    };

    if let Err(e) = result {
        eprintln!("api_hub error: {:#}", e);
        process::exit(1);
    }
    Ok(())
}
