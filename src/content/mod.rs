// content/mod.rs - Fan-out load of every collection and the docs projection

pub mod view;

pub use view::{group_timing, DocsView, ExampleGroup, SectionPage, TabView, TimingGroup};

use std::sync::Arc;

use crate::database::models::{AddressingMode, CodeExample, Pattern, Section, Timing};
use crate::database::{ContentStore, Repository, StoreError};

/// One list result per kind, each succeeding or failing on its own
pub struct ContentSnapshot {
    pub sections: Result<Vec<Section>, StoreError>,
    pub addressing_modes: Result<Vec<AddressingMode>, StoreError>,
    pub patterns: Result<Vec<Pattern>, StoreError>,
    pub code_examples: Result<Vec<CodeExample>, StoreError>,
    pub timing: Result<Vec<Timing>, StoreError>,
}

impl ContentSnapshot {
    /// Issue all five list reads at once and wait for every one of them
    pub async fn load(store: &Arc<dyn ContentStore>) -> Self {
        let section_repo = Repository::<Section>::new(store.clone());
        let addressing_repo = Repository::<AddressingMode>::new(store.clone());
        let pattern_repo = Repository::<Pattern>::new(store.clone());
        let example_repo = Repository::<CodeExample>::new(store.clone());
        let timing_repo = Repository::<Timing>::new(store.clone());

        let (sections, addressing_modes, patterns, code_examples, timing) = tokio::join!(
            section_repo.list(),
            addressing_repo.list(),
            pattern_repo.list(),
            example_repo.list(),
            timing_repo.list(),
        );

        Self {
            sections,
            addressing_modes,
            patterns,
            code_examples,
            timing,
        }
    }
}
