// editor/template.rs - Starting content for records created from the dashboard

use crate::database::models::{
    AddressingMode, AddressingModeDraft, AddressingModePatch, CodeExample, CodeExampleDraft,
    CodeExamplePatch, Editable, Pattern, PatternDraft, PatternPatch, Section,
};

/// Fixed starting content per editable kind.
///
/// `overlay` copies caller-supplied fields onto the template but never the
/// order, which the editor always assigns.
pub trait Template: Editable {
    fn template(order: i32, sections: &[Section]) -> Self::Draft;

    fn overlay(draft: &mut Self::Draft, fields: Self::Patch);

    fn draft(order: i32, sections: &[Section], fields: Self::Patch) -> Self::Draft {
        let mut draft = Self::template(order, sections);
        Self::overlay(&mut draft, fields);
        draft
    }
}

impl Template for AddressingMode {
    fn template(order: i32, _sections: &[Section]) -> AddressingModeDraft {
        AddressingModeDraft {
            title: "New addressing mode".into(),
            syntax: "EXAMPLE".into(),
            description: "Describe the addressing mode".into(),
            example: "Example code".into(),
            order,
        }
    }

    fn overlay(draft: &mut AddressingModeDraft, fields: AddressingModePatch) {
        if let Some(title) = fields.title {
            draft.title = title;
        }
        if let Some(syntax) = fields.syntax {
            draft.syntax = syntax;
        }
        if let Some(description) = fields.description {
            draft.description = description;
        }
        if let Some(example) = fields.example {
            draft.example = example;
        }
    }
}

impl Template for Pattern {
    fn template(order: i32, _sections: &[Section]) -> PatternDraft {
        PatternDraft {
            title: "New programming pattern".into(),
            code: "    ; example code".into(),
            description: "Describe the programming pattern".into(),
            order,
        }
    }

    fn overlay(draft: &mut PatternDraft, fields: PatternPatch) {
        if let Some(title) = fields.title {
            draft.title = title;
        }
        if let Some(code) = fields.code {
            draft.code = code;
        }
        if let Some(description) = fields.description {
            draft.description = description;
        }
    }
}

impl Template for CodeExample {
    fn template(order: i32, sections: &[Section]) -> CodeExampleDraft {
        CodeExampleDraft {
            title: "New example program".into(),
            code: "    ; example code".into(),
            description: Some("Describe the example program".into()),
            section_id: sections.first().map(|s| s.id),
            order,
        }
    }

    fn overlay(draft: &mut CodeExampleDraft, fields: CodeExamplePatch) {
        if let Some(title) = fields.title {
            draft.title = title;
        }
        if let Some(code) = fields.code {
            draft.code = code;
        }
        if let Some(description) = fields.description {
            draft.description = Some(description);
        }
        if let Some(section_id) = fields.section_id {
            draft.section_id = section_id;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn supplied_fields_win_but_order_does_not() {
        let fields = AddressingModePatch {
            title: Some("Test Mode".into()),
            order: Some(99),
            ..Default::default()
        };
        let draft = AddressingMode::draft(4, &[], fields);
        assert_eq!(draft.title, "Test Mode");
        assert_eq!(draft.syntax, "EXAMPLE");
        assert_eq!(draft.order, 4);
    }

    #[test]
    fn code_examples_default_to_the_first_section() {
        let section = Section {
            id: Uuid::new_v4(),
            title: "Arithmetic".into(),
            description: String::new(),
            order: 1,
            slug: "arithmetic".into(),
        };
        let draft = CodeExample::draft(1, &[section.clone()], CodeExamplePatch::default());
        assert_eq!(draft.section_id, Some(section.id));

        let draft = CodeExample::draft(1, &[], CodeExamplePatch::default());
        assert_eq!(draft.section_id, None);

        let cleared = CodeExamplePatch { section_id: Some(None), ..Default::default() };
        let draft = CodeExample::draft(1, &[section.clone()], cleared);
        assert_eq!(draft.section_id, None);
    }
}
