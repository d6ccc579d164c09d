pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::config::AppConfig;
use crate::database::Database;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Catalog CLI - migrations, fixtures and API keys for the TCG catalog")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply embedded database migrations")]
    Migrate,

    #[command(about = "Load a YAML or JSON catalog fixture")]
    Seed(commands::seed::SeedArgs),

    #[command(name = "api-key", about = "Manage API keys for write endpoints")]
    ApiKey {
        #[command(subcommand)]
        cmd: commands::api_key::ApiKeyCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = AppConfig::from_env();
    let db = Database::connect(&config).await?;

    let result = match cli.command {
        Commands::Migrate => commands::migrate::handle(&db, output_format).await,
        Commands::Seed(args) => commands::seed::handle(args, &db, output_format).await,
        Commands::ApiKey { cmd } => commands::api_key::handle(cmd, &db, &config, output_format).await,
    };

    db.close().await;
    result
}
