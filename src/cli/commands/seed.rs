use std::path::PathBuf;

use clap::Args;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::database::Database;
use crate::services::seed::{self, Fixture};

#[derive(Args)]
pub struct SeedArgs {
    #[arg(help = "Fixture file (.yaml, .yml or .json)")]
    pub file: PathBuf,
}

pub async fn handle(args: SeedArgs, db: &Database, output_format: OutputFormat) -> anyhow::Result<()> {
    let fixture = Fixture::load(&args.file)?;
    let report = seed::seed(db.pool(), fixture).await?;

    let message = format!("Seeded {}", args.file.display());
    output_success(output_format, &message, Some(serde_json::to_value(&report)?))
}
