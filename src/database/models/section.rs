use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Entity, EntityKind};

/// Groups code examples; `slug` is the unique human-readable key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub order: i32,
    pub slug: String,
}

impl Entity for Section {
    const KIND: EntityKind = EntityKind::Section;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }
}
