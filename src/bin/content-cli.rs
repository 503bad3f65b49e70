use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde_json::Value;

use kiosk_content::config::ServiceConfig;
use kiosk_content::content::ContentFormat;
use kiosk_content::observability::logging;
use kiosk_content::{ContentService, LoadOptions};

#[derive(Parser)]
#[command(name = "content-cli")]
#[command(about = "Offline tooling for kiosk content files", long_about = None)]
struct Cli {
    /// Directory holding the JSON Schemas.
    #[arg(short, long, default_value = "schemas")]
    schema_dir: PathBuf,

    /// Log level for diagnostics on stderr.
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered schema keys
    Schemas,
    /// Validate a content file and print every violation
    Validate {
        /// Schema key to validate against.
        #[arg(long)]
        schema: String,
        file: PathBuf,
    },
    /// Load a content file the way the service does and print it
    Load {
        /// Optional schema key to validate against.
        #[arg(long)]
        schema: Option<String>,
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(&cli.log_level);

    let mut config = ServiceConfig::default();
    config.schema_dir = cli.schema_dir;
    config.loader.max_retries = 0;

    let service = ContentService::new(config);
    service.initialize().await?;

    match cli.command {
        Commands::Schemas => {
            for key in service.available_schemas() {
                println!("{}", key);
            }
        }
        Commands::Validate { schema, file } => {
            let raw = tokio::fs::read_to_string(&file).await?;
            let content: Value = ContentFormat::from_path(&file)?.parse(&file, &raw)?;
            let result = service.validate_content(&content, &schema);
            println!("{}", serde_json::to_string_pretty(&result)?);
            if !result.valid {
                return Ok(ExitCode::FAILURE);
            }
        }
        Commands::Load { schema, file } => {
            let content = service
                .load_configuration(&file, schema.as_deref(), LoadOptions::bypass_cache())
                .await?;
            println!("{}", serde_json::to_string_pretty(content.as_ref())?);
        }
    }

    service.cleanup();
    Ok(ExitCode::SUCCESS)
}
