use clap::Args;
use serde_json::json;
use std::path::PathBuf;

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::Fixtures;
use crate::server::build_store;

#[derive(Args)]
pub struct SeedArgs {
    #[arg(long, help = "Fixture file to load instead of the bundled one")]
    pub fixtures: Option<PathBuf>,

    #[arg(long, help = "Insert even into kinds that already hold rows")]
    pub force: bool,
}

pub async fn handle(args: SeedArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    if config.database.url.is_none() {
        anyhow::bail!("DATABASE_URL is not set; nothing persistent to seed");
    }

    let fixtures = match &args.fixtures {
        Some(path) => Fixtures::load(path)?,
        None => Fixtures::bundled()?,
    };

    let store = build_store(config).await?;
    let report = fixtures.seed(store.as_ref(), args.force).await?;

    let total: usize = report.inserted.values().sum();
    let skipped: Vec<String> = report.skipped.iter().map(|k| k.to_string()).collect();
    let message = if skipped.is_empty() {
        format!("Seeded {} records", total)
    } else {
        format!(
            "Seeded {} records (skipped non-empty: {}; use --force to insert anyway)",
            total,
            skipped.join(", ")
        )
    };

    utils::output_success(output_format, &message, Some(json!({ "report": report })))
}
