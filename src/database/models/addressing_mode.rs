use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Editable, Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressingMode {
    pub id: Uuid,
    pub title: String,
    pub syntax: String,
    pub description: String,
    pub example: String,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressingModeDraft {
    pub title: String,
    pub syntax: String,
    pub description: String,
    pub example: String,
    pub order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressingModePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub syntax: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Entity for AddressingMode {
    const KIND: EntityKind = EntityKind::AddressingMode;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }
}

impl Editable for AddressingMode {
    type Draft = AddressingModeDraft;
    type Patch = AddressingModePatch;
}
