// database/store.rs - Object-safe seam over the table-oriented backing store

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::manager::StoreError;
use super::models::{EntityKind, MAX_ORDER};

/// One stored row as a JSON object, including `id`
pub type Row = Map<String, Value>;

/// Table-level operations shared by every backend.
///
/// Rows come back ordered ascending by `order`. Field maps passed to
/// `insert` and `update` may only name the kind's writable columns.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Short backend name for logs and health output
    fn backend(&self) -> &'static str;

    async fn list(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError>;

    async fn find_by(
        &self,
        kind: EntityKind,
        column: &str,
        value: &str,
    ) -> Result<Option<Row>, StoreError>;

    async fn insert(&self, kind: EntityKind, fields: Row) -> Result<Row, StoreError>;

    /// Returns `None` when no row has this id. An empty field map
    /// returns the current row untouched.
    async fn update(&self, kind: EntityKind, id: Uuid, fields: Row)
        -> Result<Option<Row>, StoreError>;

    /// Returns `false` when no row had this id
    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Reject any field that is not a writable column of `kind`, and any
/// `order` outside `0..=MAX_ORDER`
pub(crate) fn check_fields(kind: EntityKind, fields: &Row) -> Result<(), StoreError> {
    for name in fields.keys() {
        if kind.column(name).is_none() {
            return Err(StoreError::UnknownColumn {
                table: kind.table(),
                column: name.clone(),
            });
        }
    }
    if let Some(order) = fields.get("order") {
        check_order(order)?;
    }
    Ok(())
}

fn check_order(value: &Value) -> Result<(), StoreError> {
    let valid = value
        .as_i64()
        .is_some_and(|n| (0..=i64::from(MAX_ORDER)).contains(&n));
    if valid {
        return Ok(());
    }
    Err(StoreError::InvalidValue {
        column: "order".to_string(),
        message: format!("expected an integer between 0 and {}", MAX_ORDER),
    })
}

pub(crate) fn row_order(row: &Row) -> i64 {
    row.get("order").and_then(Value::as_i64).unwrap_or(0)
}
