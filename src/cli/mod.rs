pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "mcs51")]
#[command(about = "MCS-51 docs CLI - seed and inspect the content store")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Load fixture content into the configured store")]
    Seed(commands::seed::SeedArgs),

    #[command(about = "List the records of one kind in display order")]
    List(commands::list::ListArgs),

    #[command(about = "Check store connectivity and count records per kind")]
    Health,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
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
    let config = crate::config::config();

    match cli.command {
        Commands::Seed(args) => commands::seed::handle(args, config, output_format).await,
        Commands::List(args) => commands::list::handle(args, config, output_format).await,
        Commands::Health => commands::health::handle(config, output_format).await,
    }
}
