use serde::Serialize;

use super::collection::Collection;
use super::notice::Notices;
use super::template::Template;
use crate::content::ContentSnapshot;
use crate::database::models::{AddressingMode, CodeExample, Pattern, Section, Timing};

/// Per-session copy of every collection plus pending notices
#[derive(Debug, Clone, Default, Serialize)]
pub struct Workspace {
    pub sections: Collection<Section>,
    pub addressing_modes: Collection<AddressingMode>,
    pub patterns: Collection<Pattern>,
    pub code_examples: Collection<CodeExample>,
    pub timing: Collection<Timing>,
    pub notices: Notices,
}

impl Workspace {
    pub fn from_snapshot(snapshot: ContentSnapshot) -> Self {
        Self {
            sections: Collection::from_result(snapshot.sections),
            addressing_modes: Collection::from_result(snapshot.addressing_modes),
            patterns: Collection::from_result(snapshot.patterns),
            code_examples: Collection::from_result(snapshot.code_examples),
            timing: Collection::from_result(snapshot.timing),
            notices: Notices::default(),
        }
    }

    /// Swap in freshly loaded collections, keeping notices
    pub fn replace_collections(&mut self, snapshot: ContentSnapshot) {
        let notices = std::mem::take(&mut self.notices);
        *self = Self::from_snapshot(snapshot);
        self.notices = notices;
    }
}

/// Maps an editable kind to its collection inside a workspace
pub trait WorkspaceSlot: Template {
    /// Singular name used in notices
    const LABEL: &'static str;

    fn slot(workspace: &Workspace) -> &Collection<Self>;

    fn slot_mut(workspace: &mut Workspace) -> &mut Collection<Self>;
}

impl WorkspaceSlot for AddressingMode {
    const LABEL: &'static str = "Addressing mode";

    fn slot(workspace: &Workspace) -> &Collection<Self> {
        &workspace.addressing_modes
    }

    fn slot_mut(workspace: &mut Workspace) -> &mut Collection<Self> {
        &mut workspace.addressing_modes
    }
}

impl WorkspaceSlot for Pattern {
    const LABEL: &'static str = "Pattern";

    fn slot(workspace: &Workspace) -> &Collection<Self> {
        &workspace.patterns
    }

    fn slot_mut(workspace: &mut Workspace) -> &mut Collection<Self> {
        &mut workspace.patterns
    }
}

impl WorkspaceSlot for CodeExample {
    const LABEL: &'static str = "Code example";

    fn slot(workspace: &Workspace) -> &Collection<Self> {
        &workspace.code_examples
    }

    fn slot_mut(workspace: &mut Workspace) -> &mut Collection<Self> {
        &mut workspace.code_examples
    }
}
