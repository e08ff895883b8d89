// state.rs - Shared application state handed to every handler

use chrono::Duration;
use std::sync::Arc;

use crate::auth::identity::{self, IdentityProvider};
use crate::auth::AuthError;
use crate::config::AppConfig;
use crate::database::models::Entity;
use crate::database::{ContentStore, Fixtures, MemoryStore, Repository};
use crate::database::fixture::FixtureError;
use crate::editor::Workspaces;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn ContentStore>,
    pub identity: Arc<dyn IdentityProvider>,
    pub workspaces: Workspaces,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn ContentStore>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let notice_ttl = Duration::seconds(config.dashboard.notice_ttl_secs as i64);
        Self {
            config: Arc::new(config),
            store,
            identity,
            workspaces: Workspaces::new(notice_ttl),
        }
    }

    /// State with the identity provider chosen by configuration
    pub fn from_config(config: AppConfig, store: Arc<dyn ContentStore>) -> Result<Self, AuthError> {
        let identity: Arc<dyn IdentityProvider> = identity::from_config(&config.auth)?.into();
        Ok(Self::new(config, store, identity))
    }

    pub fn repo<T: Entity>(&self) -> Repository<T> {
        Repository::new(self.store.clone())
    }
}

/// An in-memory store holding the bundled reference content
pub async fn seeded_memory_store() -> Result<Arc<dyn ContentStore>, FixtureError> {
    let store = MemoryStore::new();
    Fixtures::bundled()?.seed(&store, false).await?;
    Ok(Arc::new(store))
}
