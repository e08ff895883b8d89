// editor/mod.rs - Per-session dashboard workspaces
//
// A workspace is loaded once per session with a fan-out read of every
// collection, then patched in place after each successful write. The
// registry lock is only held to read or patch a workspace, never across
// a store call.

pub mod collection;
pub mod notice;
pub mod template;
pub mod workspace;

pub use collection::Collection;
pub use notice::{Notice, NoticeLevel, Notices};
pub use template::Template;
pub use workspace::{Workspace, WorkspaceSlot};

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::Identity;
use crate::content::ContentSnapshot;
use crate::database::models::{Section, MAX_ORDER};
use crate::database::{ContentStore, Repository, StoreError};

struct Session {
    workspace: Workspace,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

#[derive(Clone)]
pub struct Workspaces {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    notice_ttl: Duration,
}

impl Workspaces {
    pub fn new(notice_ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            notice_ttl,
        }
    }

    pub async fn contains(&self, session: Uuid) -> bool {
        let now = Utc::now();
        self.sessions
            .read()
            .await
            .get(&session)
            .is_some_and(|s| s.is_live(now))
    }

    /// Number of workspaces currently held, live or not yet pruned
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Load a fresh workspace for `user`'s session, replacing any existing
    /// one. Workspaces whose session has expired are dropped first.
    pub async fn open(&self, user: &Identity, store: &Arc<dyn ContentStore>) {
        let workspace = Workspace::from_snapshot(ContentSnapshot::load(store).await);
        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions, Utc::now());
        sessions.insert(
            user.session_id,
            Session { workspace, expires_at: user.expires_at },
        );
        info!("Opened dashboard workspace for session {}", user.session_id);
    }

    /// Open the workspace only if this session has none yet
    pub async fn ensure_loaded(&self, user: &Identity, store: &Arc<dyn ContentStore>) {
        if !self.contains(user.session_id).await {
            self.open(user, store).await;
        }
    }

    /// Refetch every collection, keeping the session's notices
    pub async fn reload(&self, user: &Identity, store: &Arc<dyn ContentStore>) {
        let snapshot = ContentSnapshot::load(store).await;
        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(user.session_id).or_insert_with(|| Session {
            workspace: Workspace::default(),
            expires_at: user.expires_at,
        });
        session.expires_at = user.expires_at;
        session.workspace.replace_collections(snapshot);
        session
            .workspace
            .notices
            .push(NoticeLevel::Info, "Content reloaded", self.notice_ttl);
        debug!("Reloaded dashboard workspace for session {}", user.session_id);
    }

    pub async fn remove(&self, session: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&session).is_some();
        if removed {
            info!("Closed dashboard workspace for session {}", session);
        }
        removed
    }

    /// Current workspace with expired notices pruned; `None` once the
    /// session has expired
    pub async fn snapshot(&self, session: Uuid) -> Option<Workspace> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        prune_expired(&mut sessions, now);
        let workspace = &mut sessions.get_mut(&session)?.workspace;
        workspace.notices.prune(now);
        Some(workspace.clone())
    }

    /// Run `f` on a live session's workspace
    async fn with_workspace(&self, session: Uuid, f: impl FnOnce(&mut Workspace)) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(&session).filter(|s| s.is_live(Utc::now())) {
            f(&mut entry.workspace);
        }
    }

    /// Create a record from the kind's template overlaid with `fields`,
    /// placing it after the current highest order
    pub async fn create<T: WorkspaceSlot>(
        &self,
        user: &Identity,
        store: &Arc<dyn ContentStore>,
        fields: T::Patch,
    ) -> Result<T, StoreError> {
        self.ensure_loaded(user, store).await;
        let session = user.session_id;

        let (order, sections) = {
            let sessions = self.sessions.read().await;
            match sessions.get(&session) {
                Some(entry) => (
                    T::slot(&entry.workspace).next_order(),
                    entry.workspace.sections.items().to_vec(),
                ),
                None => (Some(1), Vec::<Section>::new()),
            }
        };

        let result = match order {
            Some(order) => {
                let draft = T::draft(order, &sections, fields);
                Repository::<T>::new(store.clone()).create(&draft).await
            }
            None => Err(StoreError::InvalidValue {
                column: "order".to_string(),
                message: format!("no order left above {}", MAX_ORDER),
            }),
        };

        let ttl = self.notice_ttl;
        self.with_workspace(session, |workspace| match &result {
            Ok(created) => {
                T::slot_mut(workspace).apply_created(created.clone());
                workspace
                    .notices
                    .push(NoticeLevel::Info, format!("{} created", T::LABEL), ttl);
            }
            Err(_) => workspace.notices.push(
                NoticeLevel::Error,
                format!("Failed to create {}", T::LABEL.to_lowercase()),
                ttl,
            ),
        })
        .await;
        result
    }

    /// Apply a partial update; `Ok(None)` when the record does not exist
    pub async fn update<T: WorkspaceSlot>(
        &self,
        session: Uuid,
        store: &Arc<dyn ContentStore>,
        id: Uuid,
        patch: T::Patch,
    ) -> Result<Option<T>, StoreError> {
        let result = Repository::<T>::new(store.clone()).update(id, &patch).await;

        let ttl = self.notice_ttl;
        self.with_workspace(session, |workspace| {
            let (level, message) = match &result {
                Ok(Some(updated)) => {
                    T::slot_mut(workspace).apply_updated(updated.clone());
                    (NoticeLevel::Info, format!("{} updated", T::LABEL))
                }
                Ok(None) => (
                    NoticeLevel::Error,
                    format!("{} {} no longer exists", T::LABEL, id),
                ),
                Err(_) => (
                    NoticeLevel::Error,
                    format!("Failed to update {}", T::LABEL.to_lowercase()),
                ),
            };
            workspace.notices.push(level, message, ttl);
        })
        .await;
        result
    }

    /// Delete a record; `Ok(false)` when it was already absent, in which
    /// case the workspace copy is left alone
    pub async fn delete<T: WorkspaceSlot>(
        &self,
        session: Uuid,
        store: &Arc<dyn ContentStore>,
        id: Uuid,
    ) -> Result<bool, StoreError> {
        let result = Repository::<T>::new(store.clone()).delete(id).await;

        let ttl = self.notice_ttl;
        self.with_workspace(session, |workspace| {
            let (level, message) = match &result {
                Ok(true) => {
                    T::slot_mut(workspace).apply_deleted(id);
                    (NoticeLevel::Info, format!("{} deleted", T::LABEL))
                }
                Ok(false) | Err(_) => (
                    NoticeLevel::Error,
                    format!("Failed to delete {}", T::LABEL.to_lowercase()),
                ),
            };
            workspace.notices.push(level, message, ttl);
        })
        .await;
        result
    }
}

fn prune_expired(sessions: &mut HashMap<Uuid, Session>, now: DateTime<Utc>) {
    let before = sessions.len();
    sessions.retain(|_, s| s.is_live(now));
    let dropped = before - sessions.len();
    if dropped > 0 {
        debug!("Dropped {} expired dashboard workspaces", dropped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{
        AddressingMode, AddressingModePatch, Pattern, PatternDraft, PatternPatch,
    };
    use crate::database::{Fixtures, MemoryStore};

    async fn seeded() -> Arc<dyn ContentStore> {
        let memory = MemoryStore::new();
        Fixtures::bundled().unwrap().seed(&memory, false).await.unwrap();
        Arc::new(memory)
    }

    fn workspaces() -> Workspaces {
        Workspaces::new(Duration::seconds(3))
    }

    fn user_expiring_in(ttl: Duration) -> Identity {
        Identity {
            username: "admin".into(),
            session_id: Uuid::new_v4(),
            expires_at: Utc::now() + ttl,
        }
    }

    fn user() -> Identity {
        user_expiring_in(Duration::hours(1))
    }

    #[tokio::test]
    async fn create_places_record_after_highest_order() {
        let store = seeded().await;
        let workspaces = workspaces();
        let user = user();
        workspaces.open(&user, &store).await;

        let before = workspaces.snapshot(user.session_id).await.unwrap();
        let max = before.addressing_modes.items().iter().map(|m| m.order).max().unwrap();

        let fields = AddressingModePatch {
            title: Some("Test Mode".into()),
            syntax: Some("MOV A,#1".into()),
            description: Some("d".into()),
            example: Some("e".into()),
            order: None,
        };
        let created = workspaces
            .create::<AddressingMode>(&user, &store, fields)
            .await
            .unwrap();
        assert_eq!(created.order, max + 1);

        let listed = Repository::<AddressingMode>::new(store.clone()).list().await.unwrap();
        assert_eq!(listed.iter().filter(|m| m.id == created.id).count(), 1);

        let after = workspaces.snapshot(user.session_id).await.unwrap();
        assert_eq!(after.addressing_modes.items().last().unwrap().id, created.id);
        assert_eq!(after.notices.iter().next().unwrap().level, NoticeLevel::Info);
    }

    #[tokio::test]
    async fn create_keeps_duplicate_orders_stable() {
        let store: Arc<dyn ContentStore> = Arc::new(MemoryStore::new());
        let repo = Repository::<Pattern>::new(store.clone());
        for (title, order) in [("first", 2), ("low", 1), ("second", 2)] {
            let draft = PatternDraft {
                title: title.into(),
                code: "NOP".into(),
                description: String::new(),
                order,
            };
            repo.create(&draft).await.unwrap();
        }

        let workspaces = workspaces();
        let user = user();
        workspaces.open(&user, &store).await;
        let created = workspaces
            .create::<Pattern>(&user, &store, PatternPatch::default())
            .await
            .unwrap();
        assert_eq!(created.order, 3);

        let after = workspaces.snapshot(user.session_id).await.unwrap();
        let titles: Vec<&str> = after.patterns.items().iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, ["low", "first", "second", "New programming pattern"]);
    }

    #[tokio::test]
    async fn out_of_range_orders_are_rejected_and_create_still_works() {
        let store = seeded().await;
        let workspaces = workspaces();
        let user = user();
        workspaces.open(&user, &store).await;
        let first = workspaces.snapshot(user.session_id).await.unwrap().patterns.items()[0].clone();

        for order in [-7, i32::MAX] {
            let patch = PatternPatch { order: Some(order), ..Default::default() };
            let err = workspaces
                .update::<Pattern>(user.session_id, &store, first.id, patch)
                .await
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidValue { ref column, .. } if column == "order"));
        }

        let patch = PatternPatch { order: Some(MAX_ORDER), ..Default::default() };
        workspaces
            .update::<Pattern>(user.session_id, &store, first.id, patch)
            .await
            .unwrap()
            .unwrap();

        // nothing fits above MAX_ORDER
        let err = workspaces
            .create::<Pattern>(&user, &store, PatternPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidValue { ref column, .. } if column == "order"));

        let after = workspaces.snapshot(user.session_id).await.unwrap();
        assert!(after.patterns.items().iter().all(|p| p.order >= 0));
        let last = after.notices.iter().last().unwrap();
        assert_eq!(last.level, NoticeLevel::Error);
        assert_eq!(last.message, "Failed to create pattern");
    }

    #[tokio::test]
    async fn update_resorts_the_workspace_collection() {
        let store = seeded().await;
        let workspaces = workspaces();
        let user = user();
        workspaces.open(&user, &store).await;

        let first = workspaces.snapshot(user.session_id).await.unwrap().patterns.items()[0].clone();
        let patch = PatternPatch { order: Some(100), ..Default::default() };
        workspaces
            .update::<Pattern>(user.session_id, &store, first.id, patch)
            .await
            .unwrap()
            .unwrap();

        let after = workspaces.snapshot(user.session_id).await.unwrap();
        let orders: Vec<i32> = after.patterns.items().iter().map(|p| p.order).collect();
        assert!(orders.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(after.patterns.items().last().unwrap().id, first.id);
    }

    #[tokio::test]
    async fn failed_delete_keeps_item_and_pushes_error_notice() {
        let store = seeded().await;
        let workspaces = workspaces();
        let user = user();
        workspaces.open(&user, &store).await;

        let session = user.session_id;
        let target = workspaces.snapshot(session).await.unwrap().patterns.items()[0].clone();
        assert!(workspaces.delete::<Pattern>(session, &store, target.id).await.unwrap());
        assert!(!workspaces.delete::<Pattern>(session, &store, target.id).await.unwrap());

        let after = workspaces.snapshot(session).await.unwrap();
        assert!(after.patterns.get(target.id).is_none());
        let levels: Vec<NoticeLevel> = after.notices.iter().map(|n| n.level).collect();
        assert_eq!(levels, [NoticeLevel::Info, NoticeLevel::Error]);
    }

    #[tokio::test]
    async fn removed_sessions_have_no_workspace() {
        let store = seeded().await;
        let workspaces = workspaces();
        let user = user();
        workspaces.ensure_loaded(&user, &store).await;
        assert!(workspaces.contains(user.session_id).await);
        assert!(workspaces.remove(user.session_id).await);
        assert!(workspaces.snapshot(user.session_id).await.is_none());
    }

    #[tokio::test]
    async fn expired_sessions_are_dropped_on_next_open() {
        let store = seeded().await;
        let workspaces = workspaces();

        let stale: Vec<Identity> = (0..50).map(|_| user_expiring_in(Duration::seconds(-1))).collect();
        for user in &stale {
            workspaces.open(user, &store).await;
        }
        assert!(!workspaces.contains(stale[0].session_id).await);

        let live = user();
        workspaces.open(&live, &store).await;
        assert_eq!(workspaces.len().await, 1);
        assert!(workspaces.contains(live.session_id).await);
        assert!(workspaces.snapshot(stale[49].session_id).await.is_none());
    }
}
