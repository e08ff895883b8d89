use futures::future::join_all;
use serde_json::{json, Map, Value};

use crate::cli::{utils, OutputFormat};
use crate::config::AppConfig;
use crate::database::models::EntityKind;
use crate::server::build_store;

pub async fn handle(config: &AppConfig, output_format: OutputFormat) -> anyhow::Result<()> {
    let store = build_store(config).await?;
    store.health_check().await?;

    let results = join_all(EntityKind::ALL.iter().map(|kind| store.list(*kind))).await;

    let mut counts = Map::new();
    for (kind, result) in EntityKind::ALL.iter().zip(results) {
        let value = match result {
            Ok(rows) => json!(rows.len()),
            Err(e) => json!(format!("error: {}", e)),
        };
        counts.insert(kind.table().to_string(), value);
    }

    if output_format == OutputFormat::Text {
        for (table, count) in &counts {
            println!("{:>18}  {}", table, count);
        }
    }

    utils::output_success(
        output_format,
        &format!("{} store is reachable", store.backend()),
        Some(json!({ "store": store.backend(), "counts": Value::Object(counts) })),
    )
}
