use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::database::models::ApiKey;
use crate::database::Database;

#[derive(Subcommand)]
pub enum ApiKeyCommands {
    #[command(about = "Create an active API key and print it")]
    Create {
        #[arg(long, help = "Human-readable owner of the key")]
        name: String,
        #[arg(long, help = "Usage scope; defaults to the configured write scope")]
        scope: Option<String>,
    },

    #[command(about = "Deactivate an API key")]
    Revoke {
        #[arg(help = "The key value to revoke")]
        key: String,
    },
}

pub async fn handle(
    cmd: ApiKeyCommands,
    db: &Database,
    config: &AppConfig,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    match cmd {
        ApiKeyCommands::Create { name, scope } => {
            let scope = scope.unwrap_or_else(|| config.security.api_key_scope.clone());
            let key = ApiKey::create(db.pool(), &name, &scope).await?;
            output_success(
                output_format,
                "API key created",
                Some(json!({ "name": key.name, "scope": key.usage_type, "key": key.key })),
            )
        }
        ApiKeyCommands::Revoke { key } => {
            if !ApiKey::revoke(db.pool(), &key).await? {
                anyhow::bail!("no API key matches '{}'", key);
            }
            output_success(output_format, "API key revoked", None)
        }
    }
}
