use serde::Serialize;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::error;
use uuid::Uuid;

use super::manager::StoreError;
use super::models::{Editable, Entity, Section};
use super::store::{ContentStore, Row};

/// Typed access to the rows of one entity kind
pub struct Repository<T> {
    store: Arc<dyn ContentStore>,
    _phantom: PhantomData<T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), _phantom: PhantomData }
    }
}

fn to_fields<S: Serialize>(value: &S) -> Result<Row, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::QueryError(format!("expected an object, got {}", other))),
    }
}

fn from_row<T: Entity>(row: Row) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(row))?)
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store, _phantom: PhantomData }
    }

    /// All records ordered ascending by `order`
    pub async fn list(&self) -> Result<Vec<T>, StoreError> {
        let rows = self.store.list(T::KIND).await.map_err(|e| {
            error!("Error fetching {}: {}", T::KIND, e);
            e
        })?;
        rows.into_iter().map(from_row).collect::<Result<Vec<T>, _>>().map_err(|e| {
            error!("Error decoding {}: {}", T::KIND, e);
            e
        })
    }
}

impl<T: Editable> Repository<T> {
    pub async fn create(&self, draft: &T::Draft) -> Result<T, StoreError> {
        let fields = to_fields(draft)?;
        let row = self.store.insert(T::KIND, fields).await.map_err(|e| {
            error!("Error creating {}: {}", T::KIND, e);
            e
        })?;
        from_row(row)
    }

    /// Partial update; `Ok(None)` when the id does not exist
    pub async fn update(&self, id: Uuid, patch: &T::Patch) -> Result<Option<T>, StoreError> {
        let fields = to_fields(patch)?;
        let row = self.store.update(T::KIND, id, fields).await.map_err(|e| {
            error!("Error updating {} {}: {}", T::KIND, id, e);
            e
        })?;
        row.map(from_row).transpose()
    }

    /// `Ok(false)` when the record was already absent
    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.store.delete(T::KIND, id).await.map_err(|e| {
            error!("Error deleting {} {}: {}", T::KIND, id, e);
            e
        })
    }
}

impl Repository<Section> {
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Section>, StoreError> {
        let row = self.store.find_by(Section::KIND, "slug", slug).await.map_err(|e| {
            error!("Error fetching section with slug {}: {}", slug, e);
            e
        })?;
        row.map(from_row).transpose()
    }
}
