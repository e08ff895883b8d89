use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{null_as_empty, Entity, EntityKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timing {
    pub id: Uuid,
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub details: Vec<String>,
    pub order: i32,
}

impl Entity for Timing {
    const KIND: EntityKind = EntityKind::Timing;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }
}
