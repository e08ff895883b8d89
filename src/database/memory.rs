// database/memory.rs - In-process backend for local development and tests

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::manager::StoreError;
use super::models::{EntityKind, SqlType};
use super::store::{check_fields, row_order, ContentStore, Row};

/// Rows kept per table in insertion order
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<EntityKind, Vec<Row>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Coerce incoming values the way the SQL casts would
fn coerce(kind: EntityKind, fields: Row) -> Result<Row, StoreError> {
    let mut out = Row::new();
    for (name, value) in fields {
        let Some(column) = kind.column(&name) else {
            continue;
        };
        let invalid = |message: &str| StoreError::InvalidValue {
            column: name.clone(),
            message: message.to_string(),
        };
        let value = match (column.sql_type, value) {
            (_, Value::Null) => Value::Null,
            (SqlType::Text, Value::String(s)) => Value::String(s),
            (SqlType::Uuid, Value::String(s)) => {
                let id = Uuid::parse_str(&s).map_err(|_| invalid("expected a UUID"))?;
                Value::String(id.to_string())
            }
            (SqlType::Int, Value::Number(n)) => {
                let n = n.as_i64().ok_or_else(|| invalid("expected an integer"))?;
                i32::try_from(n).map_err(|_| invalid("integer out of range"))?;
                Value::from(n)
            }
            (SqlType::TextArray, Value::Array(items)) => {
                if !items.iter().all(Value::is_string) {
                    return Err(invalid("expected an array of strings"));
                }
                Value::Array(items)
            }
            (sql_type, _) => return Err(invalid(&format!("expected {}", sql_type.cast()))),
        };
        out.insert(name, value);
    }
    Ok(out)
}

fn row_id(row: &Row) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

#[async_trait]
impl ContentStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = tables.get(&kind).cloned().unwrap_or_default();
        // stable: equal orders keep insertion order
        rows.sort_by_key(row_order);
        Ok(rows)
    }

    async fn find_by(
        &self,
        kind: EntityKind,
        column: &str,
        value: &str,
    ) -> Result<Option<Row>, StoreError> {
        if column != "id" && kind.column(column).is_none() {
            return Err(StoreError::UnknownColumn { table: kind.table(), column: column.to_string() });
        }
        let rows = self.list(kind).await?;
        Ok(rows
            .into_iter()
            .find(|row| row.get(column).and_then(Value::as_str) == Some(value)))
    }

    async fn insert(&self, kind: EntityKind, fields: Row) -> Result<Row, StoreError> {
        check_fields(kind, &fields)?;
        let mut row = Row::new();
        row.insert("id".into(), Value::String(Uuid::new_v4().to_string()));
        // unset columns read back as null, like a nullable table column
        for column in kind.columns() {
            row.insert(column.name.into(), Value::Null);
        }
        row.extend(coerce(kind, fields)?);

        let mut tables = self.tables.write().await;
        tables.entry(kind).or_default().push(row.clone());
        Ok(row)
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        fields: Row,
    ) -> Result<Option<Row>, StoreError> {
        check_fields(kind, &fields)?;
        let fields = coerce(kind, fields)?;
        let id = id.to_string();

        let mut tables = self.tables.write().await;
        let Some(row) = tables
            .get_mut(&kind)
            .and_then(|rows| rows.iter_mut().find(|r| row_id(r) == Some(id.as_str())))
        else {
            return Ok(None);
        };
        row.extend(fields);
        Ok(Some(row.clone()))
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, StoreError> {
        let id = id.to_string();
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(&kind) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|r| row_id(r) != Some(id.as_str()));
        Ok(rows.len() != before)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
