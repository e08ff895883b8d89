// database/models/mod.rs - Content record kinds and their table layout

pub mod addressing_mode;
pub mod code_example;
pub mod pattern;
pub mod section;
pub mod timing;

pub use addressing_mode::{AddressingMode, AddressingModeDraft, AddressingModePatch};
pub use code_example::{CodeExample, CodeExampleDraft, CodeExamplePatch};
pub use pattern::{Pattern, PatternDraft, PatternPatch};
pub use section::Section;
pub use timing::Timing;

use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// The five kinds of content the service stores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Section,
    AddressingMode,
    Pattern,
    CodeExample,
    Timing,
}

/// SQL type of a writable column, used to cast bound parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Uuid,
    Int,
    TextArray,
}

impl SqlType {
    pub fn cast(&self) -> &'static str {
        match self {
            SqlType::Text => "text",
            SqlType::Uuid => "uuid",
            SqlType::Int => "int4",
            SqlType::TextArray => "text[]",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
}

const fn col(name: &'static str, sql_type: SqlType) -> Column {
    Column { name, sql_type }
}

const SECTION_COLUMNS: &[Column] = &[
    col("title", SqlType::Text),
    col("description", SqlType::Text),
    col("order", SqlType::Int),
    col("slug", SqlType::Text),
];

const ADDRESSING_MODE_COLUMNS: &[Column] = &[
    col("title", SqlType::Text),
    col("syntax", SqlType::Text),
    col("description", SqlType::Text),
    col("example", SqlType::Text),
    col("order", SqlType::Int),
];

const PATTERN_COLUMNS: &[Column] = &[
    col("title", SqlType::Text),
    col("code", SqlType::Text),
    col("description", SqlType::Text),
    col("order", SqlType::Int),
];

const CODE_EXAMPLE_COLUMNS: &[Column] = &[
    col("title", SqlType::Text),
    col("code", SqlType::Text),
    col("description", SqlType::Text),
    col("section_id", SqlType::Uuid),
    col("order", SqlType::Int),
];

const TIMING_COLUMNS: &[Column] = &[
    col("category", SqlType::Text),
    col("details", SqlType::TextArray),
    col("order", SqlType::Int),
];

impl EntityKind {
    pub const ALL: [EntityKind; 5] = [
        EntityKind::Section,
        EntityKind::AddressingMode,
        EntityKind::Pattern,
        EntityKind::CodeExample,
        EntityKind::Timing,
    ];

    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Section => "sections",
            EntityKind::AddressingMode => "addressing_modes",
            EntityKind::Pattern => "patterns",
            EntityKind::CodeExample => "code_examples",
            EntityKind::Timing => "timing",
        }
    }

    /// Writable columns; `id` is store-assigned and never listed
    pub fn columns(&self) -> &'static [Column] {
        match self {
            EntityKind::Section => SECTION_COLUMNS,
            EntityKind::AddressingMode => ADDRESSING_MODE_COLUMNS,
            EntityKind::Pattern => PATTERN_COLUMNS,
            EntityKind::CodeExample => CODE_EXAMPLE_COLUMNS,
            EntityKind::Timing => TIMING_COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<Column> {
        self.columns().iter().copied().find(|c| c.name == name)
    }

    /// Parse a table name or a dashed route segment
    pub fn parse(name: &str) -> Option<Self> {
        let normalized = name.replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|k| k.table() == normalized || k.singular() == normalized)
    }

    fn singular(&self) -> &'static str {
        match self {
            EntityKind::Section => "section",
            EntityKind::AddressingMode => "addressing_mode",
            EntityKind::Pattern => "pattern",
            EntityKind::CodeExample => "code_example",
            EntityKind::Timing => "timing",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

/// Highest `order` a record may hold, so `max + 1` always fits
pub const MAX_ORDER: i32 = i32::MAX - 1;

/// A stored record of one kind
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> Uuid;
    fn order(&self) -> i32;
}

/// Kinds the dashboard may create, update and delete.
/// Section and Timing are read-only and do not implement this.
pub trait Editable: Entity {
    /// Full set of fields for a new record (everything but `id`)
    type Draft: Serialize + DeserializeOwned + Send + Sync;
    /// Field-level partial update; omitted fields keep their value
    type Patch: Serialize + DeserializeOwned + Send + Sync;
}

/// Stored data sometimes holds "" where no section is set
pub(crate) fn empty_uuid_as_none<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => Uuid::parse_str(s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// A NULL list column reads as an empty list
pub(crate) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// For patches: absent stays `None`, while `null` or `""` clears the
/// section with `Some(None)`
pub(crate) fn supplied_uuid_or_none<'de, D>(deserializer: D) -> Result<Option<Option<Uuid>>, D::Error>
where
    D: Deserializer<'de>,
{
    empty_uuid_as_none(deserializer).map(Some)
}
