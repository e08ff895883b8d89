use anyhow::anyhow;
use clap::Args;
use serde_json::{json, Value};

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::models::EntityKind;
use crate::server::build_store;

#[derive(Args)]
pub struct ListArgs {
    #[arg(help = "Kind to list: sections, addressing-modes, patterns, code-examples or timing")]
    pub kind: String,
}

fn title_of(kind: EntityKind, row: &serde_json::Map<String, Value>) -> String {
    let field = match kind {
        EntityKind::Timing => "category",
        _ => "title",
    };
    row.get(field)
        .and_then(Value::as_str)
        .unwrap_or("(untitled)")
        .to_string()
}

pub async fn handle(args: ListArgs, config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let kind = EntityKind::parse(&args.kind).ok_or_else(|| anyhow!("Unknown kind '{}'", args.kind))?;

    let store = build_store(config).await?;
    let rows = store.list(kind).await?;

    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ kind.table(): rows }))?);
        }
        OutputFormat::Text => {
            if rows.is_empty() {
                println!("No {} found", kind);
            }
            for row in &rows {
                let order = row.get("order").and_then(Value::as_i64);
                println!("{}", utils::summary_line(order, &title_of(kind, row), 60));
            }
        }
    }
    Ok(())
}
