// database/fixture.rs - Bundled reference content and store seeding

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

use super::manager::StoreError;
use super::models::EntityKind;
use super::store::{ContentStore, Row};

/// The content shipped with the service
pub const BUNDLED: &str = include_str!("../../fixtures/mcs51.yaml");

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixtures {
    #[serde(default)]
    pub sections: Vec<SectionFixture>,
    #[serde(default)]
    pub addressing_modes: Vec<Value>,
    #[serde(default)]
    pub patterns: Vec<Value>,
    #[serde(default)]
    pub code_examples: Vec<CodeExampleFixture>,
    #[serde(default)]
    pub timing: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectionFixture {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub order: i32,
}

/// A code example refers to its section by slug
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeExampleFixture {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub section: Option<String>,
    pub order: i32,
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("Failed to read fixtures: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid fixture file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("Fixture row for {kind} is not a mapping")]
    NotAMapping { kind: EntityKind },
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Rows inserted per kind
#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub inserted: HashMap<EntityKind, usize>,
    pub skipped: Vec<EntityKind>,
}

impl Fixtures {
    pub fn bundled() -> Result<Self, FixtureError> {
        Self::parse(BUNDLED)
    }

    pub fn parse(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self, FixtureError> {
        let raw = std::fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    /// Insert the fixtures into `store`. Kinds that already hold rows are
    /// skipped unless `force` is set.
    pub async fn seed(&self, store: &dyn ContentStore, force: bool) -> Result<SeedReport, FixtureError> {
        let mut report = SeedReport::default();

        // Sections go first so examples can resolve their slugs
        let mut section_ids: HashMap<String, Value> = HashMap::new();
        if Self::should_seed(store, EntityKind::Section, force, &mut report).await? {
            for section in &self.sections {
                let row = store.insert(EntityKind::Section, to_row(EntityKind::Section, json!(section))?).await?;
                section_ids.insert(section.slug.clone(), row.get("id").cloned().unwrap_or(Value::Null));
            }
            report.inserted.insert(EntityKind::Section, self.sections.len());
        } else {
            for row in store.list(EntityKind::Section).await? {
                if let (Some(Value::String(slug)), Some(id)) = (row.get("slug"), row.get("id")) {
                    section_ids.insert(slug.clone(), id.clone());
                }
            }
        }

        for (kind, rows) in [
            (EntityKind::AddressingMode, &self.addressing_modes),
            (EntityKind::Pattern, &self.patterns),
            (EntityKind::Timing, &self.timing),
        ] {
            if Self::should_seed(store, kind, force, &mut report).await? {
                for value in rows {
                    store.insert(kind, to_row(kind, value.clone())?).await?;
                }
                report.inserted.insert(kind, rows.len());
            }
        }

        if Self::should_seed(store, EntityKind::CodeExample, force, &mut report).await? {
            for example in &self.code_examples {
                let section_id = example
                    .section
                    .as_ref()
                    .and_then(|slug| section_ids.get(slug).cloned())
                    .unwrap_or(Value::Null);
                let row = json!({
                    "title": example.title,
                    "code": example.code,
                    "description": example.description,
                    "section_id": section_id,
                    "order": example.order,
                });
                store.insert(EntityKind::CodeExample, to_row(EntityKind::CodeExample, row)?).await?;
            }
            report.inserted.insert(EntityKind::CodeExample, self.code_examples.len());
        }

        info!("Seeded {} store: {:?}", store.backend(), report.inserted);
        Ok(report)
    }

    async fn should_seed(
        store: &dyn ContentStore,
        kind: EntityKind,
        force: bool,
        report: &mut SeedReport,
    ) -> Result<bool, StoreError> {
        if force || store.list(kind).await?.is_empty() {
            return Ok(true);
        }
        report.skipped.push(kind);
        Ok(false)
    }
}

fn to_row(kind: EntityKind, value: Value) -> Result<Row, FixtureError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(FixtureError::NotAMapping { kind }),
    }
}
