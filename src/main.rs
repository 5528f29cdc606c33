use anyhow::Context;
use clap::{Parser, Subcommand};
use configuration::{init_tracing, load_config, ConfigArgs};
use database::{connect, init_schema, DbRepository};
use std::sync::Arc;

/// The main entry point for the diet plan service.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let cli = Cli::parse();

    let config = load_config(&cli.config_args.config)
        .with_context(|| format!("Failed to load {}", cli.config_args.config.display()))?;

    // Held until exit so buffered log lines reach the file.
    let _log_guard = init_tracing(&config.logging).context("Failed to initialize logging")?;

    // Initialize the database connection and make sure the tables exist
    let db_pool = connect(&config.database)
        .await
        .context("Failed to connect to the database")?;
    init_schema(&db_pool)
        .await
        .context("Failed to create the database schema")?;

    // Execute the appropriate command
    match cli.command {
        Commands::Serve => {
            let store = Arc::new(DbRepository::new(db_pool));
            if let Err(e) = web_server::run_server(&config.server, store).await {
                tracing::error!(error = ?e, "Web server stopped with an error.");
                return Err(e);
            }
        }
        Commands::InitSchema => {
            tracing::info!("Schema initialized; exiting.");
        }
    }

    Ok(())
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// A REST backend for diet plans, their meals and their foods.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    config_args: ConfigArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API.
    Serve,
    /// Create the database tables if they are missing, then exit.
    InitSchema,
}
