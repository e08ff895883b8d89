#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, redirect::Policy, Client, StatusCode};
use serde_json::{json, Value};
use uuid::Uuid;

use mcs51_docs::auth::FixedCredentials;
use mcs51_docs::config::AppConfig;
use mcs51_docs::database::models::EntityKind;
use mcs51_docs::database::{ContentStore, MemoryStore, Row, StoreError};
use mcs51_docs::server;
use mcs51_docs::state::{seeded_memory_store, AppState};

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub state: AppState,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/health")).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }
}

/// Serve the router in-process on a free port over `store`
pub async fn spawn_with_store(store: Arc<dyn ContentStore>) -> Result<TestServer> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;

    let mut config = AppConfig::development();
    config.server.port = port;
    config.security.session_secret = "integration-test-secret".to_string();

    let state = AppState::new(config, store, Arc::new(FixedCredentials::default()));
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port)).await?;
    let app = server::app(state.clone());
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    let server = TestServer {
        port,
        base_url: format!("http://127.0.0.1:{}", port),
        state,
    };
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Server over the bundled reference content
pub async fn spawn() -> Result<TestServer> {
    spawn_with_store(seeded_memory_store().await?).await
}

/// Client that reports redirects instead of following them
pub fn client() -> Client {
    Client::builder()
        .redirect(Policy::none())
        .build()
        .expect("client builds")
}

/// The `name=value` part of a Set-Cookie header
pub fn cookie_pair(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get(header::SET_COOKIE)?
        .to_str()
        .ok()?
        .split(';')
        .next()
        .map(str::to_string)
}

/// Sign in as admin and return the Cookie header value
pub async fn login(server: &TestServer, client: &Client) -> Result<String> {
    let resp = client
        .post(server.url("/login"))
        .json(&json!({ "username": "admin", "password": "admin" }))
        .send()
        .await?;
    anyhow::ensure!(resp.status() == StatusCode::OK, "login failed: {}", resp.status());
    cookie_pair(&resp).context("login did not set a cookie")
}

pub fn location(resp: &reqwest::Response) -> Option<&str> {
    resp.headers().get(header::LOCATION)?.to_str().ok()
}

pub async fn json_body(resp: reqwest::Response) -> Result<Value> {
    Ok(resp.json::<Value>().await?)
}

/// Memory store whose chosen list reads, and optionally every write, fail
pub struct FailingStore {
    inner: MemoryStore,
    failing_lists: HashSet<EntityKind>,
    failing_writes: bool,
}

impl FailingStore {
    pub async fn seeded(failing_lists: &[EntityKind], failing_writes: bool) -> Result<Self> {
        let inner = MemoryStore::new();
        mcs51_docs::database::Fixtures::bundled()?.seed(&inner, false).await?;
        Ok(Self {
            inner,
            failing_lists: failing_lists.iter().copied().collect(),
            failing_writes,
        })
    }

    fn write_guard(&self) -> Result<(), StoreError> {
        if self.failing_writes {
            Err(StoreError::QueryError("simulated write failure".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentStore for FailingStore {
    fn backend(&self) -> &'static str {
        "failing"
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
        if self.failing_lists.contains(&kind) {
            return Err(StoreError::QueryError(format!("simulated read failure on {}", kind)));
        }
        self.inner.list(kind).await
    }

    async fn find_by(&self, kind: EntityKind, column: &str, value: &str) -> Result<Option<Row>, StoreError> {
        self.inner.find_by(kind, column, value).await
    }

    async fn insert(&self, kind: EntityKind, fields: Row) -> Result<Row, StoreError> {
        self.write_guard()?;
        self.inner.insert(kind, fields).await
    }

    async fn update(&self, kind: EntityKind, id: Uuid, fields: Row) -> Result<Option<Row>, StoreError> {
        self.write_guard()?;
        self.inner.update(kind, id, fields).await
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, StoreError> {
        self.write_guard()?;
        self.inner.delete(kind, id).await
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::QueryError("simulated outage".into()))
    }
}
