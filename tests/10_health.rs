mod common;

use std::sync::Arc;

use anyhow::Result;
use reqwest::StatusCode;

#[tokio::test]
async fn health_reports_memory_store() -> Result<()> {
    let server = common::spawn().await?;

    let res = common::client().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = common::json_body(res).await?;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "memory");
    Ok(())
}

#[tokio::test]
async fn health_degrades_when_store_is_down() -> Result<()> {
    let store = common::FailingStore::seeded(&[], false).await?;
    let server = common::spawn_with_store(Arc::new(store)).await?;

    let res = common::client().get(server.url("/health")).send().await?;
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = common::json_body(res).await?;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}
