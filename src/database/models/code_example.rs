use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{empty_uuid_as_none, supplied_uuid_or_none, Editable, Entity, EntityKind};

/// A complete program listing. `section_id` is a soft reference:
/// nothing checks that the section exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeExample {
    pub id: Uuid,
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_uuid_as_none")]
    pub section_id: Option<Uuid>,
    pub order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeExampleDraft {
    pub title: String,
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "empty_uuid_as_none")]
    pub section_id: Option<Uuid>,
    pub order: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeExamplePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `Some(None)` moves the example out of every section
    #[serde(
        default,
        deserialize_with = "supplied_uuid_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub section_id: Option<Option<Uuid>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<i32>,
}

impl Entity for CodeExample {
    const KIND: EntityKind = EntityKind::CodeExample;

    fn id(&self) -> Uuid {
        self.id
    }

    fn order(&self) -> i32 {
        self.order
    }
}

impl Editable for CodeExample {
    type Draft = CodeExampleDraft;
    type Patch = CodeExamplePatch;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_section_reference_reads_as_none() {
        let example: CodeExample = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "title": "CRC-8",
            "code": "CRC8:",
            "section_id": "",
            "order": 1
        }))
        .unwrap();
        assert_eq!(example.section_id, None);
        assert_eq!(example.description, None);
    }

    #[test]
    fn patch_tells_a_cleared_section_from_an_absent_one() {
        let absent: CodeExamplePatch = serde_json::from_value(json!({ "title": "CRC-8" })).unwrap();
        assert_eq!(absent.section_id, None);

        for cleared in [json!({ "section_id": null }), json!({ "section_id": "" })] {
            let patch: CodeExamplePatch = serde_json::from_value(cleared).unwrap();
            assert_eq!(patch.section_id, Some(None));
            assert_eq!(serde_json::to_value(&patch).unwrap(), json!({ "section_id": null }));
        }

        let id = Uuid::new_v4();
        let set: CodeExamplePatch = serde_json::from_value(json!({ "section_id": id })).unwrap();
        assert_eq!(set.section_id, Some(Some(id)));

        assert!(serde_json::from_value::<CodeExamplePatch>(json!({ "section_id": "nope" })).is_err());
    }

    #[test]
    fn patch_serializes_only_supplied_fields() {
        let patch = CodeExamplePatch { title: Some("Average".into()), ..Default::default() };
        let value = serde_json::to_value(&patch).unwrap();
        assert_eq!(value, json!({ "title": "Average" }));
    }
}
