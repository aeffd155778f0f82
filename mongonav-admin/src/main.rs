use anyhow::Result;
use clap::{Parser, Subcommand};
use mongonav_core::{init_logging, NavigatorClient, NavigatorConfig, SlowQueryLogger};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

mod commands;

use commands::*;

#[derive(Parser)]
#[command(name = "mongonav")]
#[command(about = "MongoDB Navigator CLI")]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "mongonav.toml", env = "MONGONAV_CONFIG")]
    config: PathBuf,

    /// Backend base URL (overrides config and MONGONAV_BASE_URL)
    #[arg(short, long)]
    server: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Emit logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database listing
    Db {
        #[command(subcommand)]
        action: DatabaseCommands,
    },
    /// Collection browsing and document editing
    Collection {
        #[command(subcommand)]
        action: CollectionCommands,
    },
    /// Query builder: compile and run conditions, or ask the AI
    Query {
        #[command(subcommand)]
        action: QueryCommands,
    },
    /// Server statistics and monitoring
    Stats {
        #[command(subcommand)]
        action: StatsCommands,
    },
    /// Schema file preview
    Schema {
        #[command(subcommand)]
        action: SchemaCommands,
    },
    /// Local configuration and backend settings
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = NavigatorConfig::load(&cli.config)?;
    config.apply_env()?;
    if let Some(server) = cli.server {
        config.api.base_url = server;
    }
    if cli.verbose {
        config.logging.level = "DEBUG".to_string();
    }
    if cli.json_logs {
        config.logging.json_format = true;
    }
    config.validate()?;

    init_logging(&config.logging)?;
    info!("MongoNav CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let slow_queries = Arc::new(SlowQueryLogger::from_config(&config.logging));
    let client = NavigatorClient::new(&config.api)?.with_slow_query_logger(slow_queries);

    let result = match cli.command {
        Commands::Db { action } => execute_database_command(&client, action).await,
        Commands::Collection { action } => {
            execute_collection_command(&client, &config.query, action).await
        }
        Commands::Query { action } => execute_query_command(&client, &config.query, action).await,
        Commands::Stats { action } => {
            execute_stats_command(&client, &config.monitor, action).await
        }
        Commands::Schema { action } => execute_schema_command(action).await,
        Commands::Config { action } => {
            execute_config_command(&client, &config, &cli.config, action).await
        }
    };

    match result {
        Ok(_) => {
            info!("Command completed successfully");
            Ok(())
        }
        Err(e) => {
            error!("Command failed: {}", e);
            Err(e)
        }
    }
}
