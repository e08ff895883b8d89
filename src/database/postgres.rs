// database/postgres.rs - PostgreSQL backend over sqlx
//
// Rows are read back with row_to_json so every table maps onto the same
// JSON row shape. Bound parameters are sent as text/int8/text[] and cast
// to the column's declared type in SQL.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgArguments, PgPool, Row as _};
use tracing::debug;
use uuid::Uuid;

use super::manager::{DatabaseManager, StoreError};
use super::models::{Column, EntityKind, SqlType};
use super::store::{check_fields, ContentStore, Row};

type PgQuery<'q> = sqlx::query::Query<'q, sqlx::Postgres, PgArguments>;

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn table(kind: EntityKind) -> String {
        DatabaseManager::quote_identifier(kind.table())
    }

    async fn fetch_rows(&self, sql: &str, binds: Vec<Bound>) -> Result<Vec<Row>, StoreError> {
        debug!("SQL: {}", sql);
        let mut q = sqlx::query(sql);
        for b in binds {
            q = b.bind(q);
        }
        let rows = q.fetch_all(&self.pool).await?;
        rows.into_iter().map(decode_row).collect()
    }
}

/// A parameter already converted to the Rust type sqlx will send
enum Bound {
    Text(Option<String>),
    Int(Option<i64>),
    TextArray(Option<Vec<String>>),
    Id(Uuid),
}

impl Bound {
    fn from_value(column: Column, value: Value) -> Result<Self, StoreError> {
        let invalid = |message: &str| StoreError::InvalidValue {
            column: column.name.to_string(),
            message: message.to_string(),
        };
        match (column.sql_type, value) {
            (SqlType::Text | SqlType::Uuid, Value::Null) => Ok(Bound::Text(None)),
            (SqlType::Int, Value::Null) => Ok(Bound::Int(None)),
            (SqlType::TextArray, Value::Null) => Ok(Bound::TextArray(None)),
            (SqlType::Text | SqlType::Uuid, Value::String(s)) => Ok(Bound::Text(Some(s))),
            (SqlType::Int, Value::Number(n)) => n
                .as_i64()
                .map(|i| Bound::Int(Some(i)))
                .ok_or_else(|| invalid("expected an integer")),
            (SqlType::TextArray, Value::Array(items)) => items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => Ok(s),
                    _ => Err(invalid("expected an array of strings")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|v| Bound::TextArray(Some(v))),
            (sql_type, _) => Err(invalid(&format!("expected {}", sql_type.cast()))),
        }
    }

    fn bind<'q>(self, q: PgQuery<'q>) -> PgQuery<'q> {
        match self {
            Bound::Text(v) => q.bind(v),
            Bound::Int(v) => q.bind(v),
            Bound::TextArray(v) => q.bind(v),
            Bound::Id(id) => q.bind(id),
        }
    }
}

fn decode_row(row: sqlx::postgres::PgRow) -> Result<Row, StoreError> {
    let value: Value = row.try_get("row")?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::QueryError(format!("unexpected row format: {}", other))),
    }
}

/// Split a field map into quoted column names, cast placeholders and binds.
/// Placeholders start at `$start`.
fn assignments(
    kind: EntityKind,
    fields: Row,
    start: usize,
) -> Result<(Vec<String>, Vec<String>, Vec<Bound>), StoreError> {
    check_fields(kind, &fields)?;
    let mut names = Vec::with_capacity(fields.len());
    let mut placeholders = Vec::with_capacity(fields.len());
    let mut binds = Vec::with_capacity(fields.len());
    for (i, (name, value)) in fields.into_iter().enumerate() {
        let column = kind.column(&name).ok_or_else(|| StoreError::UnknownColumn {
            table: kind.table(),
            column: name.clone(),
        })?;
        names.push(DatabaseManager::quote_identifier(column.name));
        placeholders.push(format!("${}::{}", start + i, column.sql_type.cast()));
        binds.push(Bound::from_value(column, value)?);
    }
    Ok((names, placeholders, binds))
}

#[async_trait]
impl ContentStore for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn list(&self, kind: EntityKind) -> Result<Vec<Row>, StoreError> {
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM {} t ORDER BY t.\"order\" ASC",
            Self::table(kind)
        );
        self.fetch_rows(&sql, vec![]).await
    }

    async fn find_by(
        &self,
        kind: EntityKind,
        column: &str,
        value: &str,
    ) -> Result<Option<Row>, StoreError> {
        let (column_sql, bound) = if column == "id" {
            let id = Uuid::parse_str(value).map_err(|_| StoreError::InvalidValue {
                column: "id".into(),
                message: "expected a UUID".into(),
            })?;
            ("t.\"id\" = $1".to_string(), Bound::Id(id))
        } else {
            let c = kind.column(column).ok_or_else(|| StoreError::UnknownColumn {
                table: kind.table(),
                column: column.to_string(),
            })?;
            (
                format!(
                    "t.{} = $1::{}",
                    DatabaseManager::quote_identifier(c.name),
                    c.sql_type.cast()
                ),
                Bound::from_value(c, Value::String(value.to_string()))?,
            )
        };
        let sql = format!(
            "SELECT row_to_json(t) AS row FROM {} t WHERE {} ORDER BY t.\"order\" ASC LIMIT 1",
            Self::table(kind),
            column_sql
        );
        Ok(self.fetch_rows(&sql, vec![bound]).await?.into_iter().next())
    }

    async fn insert(&self, kind: EntityKind, fields: Row) -> Result<Row, StoreError> {
        let (names, placeholders, binds) = assignments(kind, fields, 1)?;
        let sql = if names.is_empty() {
            format!(
                "INSERT INTO {} AS t DEFAULT VALUES RETURNING row_to_json(t) AS row",
                Self::table(kind)
            )
        } else {
            format!(
                "INSERT INTO {} AS t ({}) VALUES ({}) RETURNING row_to_json(t) AS row",
                Self::table(kind),
                names.join(", "),
                placeholders.join(", ")
            )
        };
        self.fetch_rows(&sql, binds)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::QueryError(format!("insert into {} returned no row", kind)))
    }

    async fn update(
        &self,
        kind: EntityKind,
        id: Uuid,
        fields: Row,
    ) -> Result<Option<Row>, StoreError> {
        if fields.is_empty() {
            return self.find_by(kind, "id", &id.to_string()).await;
        }
        let (names, placeholders, mut binds) = assignments(kind, fields, 2)?;
        let sets: Vec<String> = names
            .iter()
            .zip(placeholders.iter())
            .map(|(n, p)| format!("{} = {}", n, p))
            .collect();
        let sql = format!(
            "UPDATE {} AS t SET {} WHERE t.\"id\" = $1 RETURNING row_to_json(t) AS row",
            Self::table(kind),
            sets.join(", ")
        );
        binds.insert(0, Bound::Id(id));
        Ok(self.fetch_rows(&sql, binds).await?.into_iter().next())
    }

    async fn delete(&self, kind: EntityKind, id: Uuid) -> Result<bool, StoreError> {
        let sql = format!("DELETE FROM {} WHERE \"id\" = $1", Self::table(kind));
        debug!("SQL: {}", sql);
        let result = sqlx::query(&sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected() > 0)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assignments_cast_placeholders_from_offset() {
        let mut fields = Row::new();
        fields.insert("title".into(), json!("Average"));
        fields.insert("section_id".into(), json!(Uuid::nil().to_string()));
        fields.insert("order".into(), json!(3));

        let (names, placeholders, binds) = assignments(EntityKind::CodeExample, fields, 2).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(binds.len(), 3);
        assert!(placeholders.iter().all(|p| !p.starts_with("$1:")));
        let order_at = names.iter().position(|n| n == "\"order\"").unwrap();
        assert!(placeholders[order_at].ends_with("::int4"));
        let section_at = names.iter().position(|n| n == "\"section_id\"").unwrap();
        assert!(placeholders[section_at].ends_with("::uuid"));
    }

    #[test]
    fn assignments_reject_unknown_columns() {
        let mut fields = Row::new();
        fields.insert("title; DROP TABLE patterns".into(), json!("x"));
        assert!(matches!(
            assignments(EntityKind::Pattern, fields, 1),
            Err(StoreError::UnknownColumn { .. })
        ));
    }
}
