// content/view.rs - Read-only projection of the fetched collections
//
// Four fixed tabs: addressing modes, patterns, examples (grouped by
// section) and timing (merged by category). Timing is never filtered.

use serde::Serialize;
use uuid::Uuid;

use super::ContentSnapshot;
use crate::database::models::{AddressingMode, CodeExample, Pattern, Section, Timing};
use crate::database::StoreError;
use crate::filter::{Searchable, SearchFilter};

pub const NO_SECTION: &str = "No section";

/// What one tab shows
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum TabView<T> {
    Items { items: Vec<T> },
    NoResults { message: String },
    Error { message: String },
}

impl<T> TabView<T> {
    pub fn items(&self) -> Option<&[T]> {
        match self {
            TabView::Items { items } => Some(items.as_slice()),
            TabView::NoResults { .. } | TabView::Error { .. } => None,
        }
    }
}

/// Why a tab has nothing to list
enum Miss {
    Failed(String),
    Unmatched(String),
}

impl Miss {
    fn into_view<T>(self) -> TabView<T> {
        match self {
            Miss::Failed(message) => TabView::Error { message },
            Miss::Unmatched(message) => TabView::NoResults { message },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SectionSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExampleGroup {
    /// `None` collects examples whose section is unset or unknown
    pub section: Option<SectionSummary>,
    pub title: String,
    pub examples: Vec<CodeExample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimingGroup {
    pub category: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocsView {
    pub query: Option<String>,
    pub addressing: TabView<AddressingMode>,
    pub patterns: TabView<Pattern>,
    pub examples: TabView<ExampleGroup>,
    pub timing: TabView<TimingGroup>,
}

fn searched<T: Searchable + Clone>(
    loaded: &Result<Vec<T>, StoreError>,
    filter: Option<&SearchFilter>,
    label: &str,
) -> Result<Vec<T>, Miss> {
    let items = loaded
        .as_ref()
        .map_err(|_| Miss::Failed(format!("Failed to load {}", label)))?;
    match filter {
        None => Ok(items.clone()),
        Some(f) => {
            let kept = f.apply(items);
            if kept.is_empty() {
                Err(Miss::Unmatched(format!("No results for \"{}\"", f.query())))
            } else {
                Ok(kept)
            }
        }
    }
}

impl DocsView {
    pub fn build(snapshot: &ContentSnapshot, query: Option<&str>) -> Self {
        let filter = SearchFilter::parse(query);
        let filter = filter.as_ref();

        let addressing = searched(&snapshot.addressing_modes, filter, "addressing modes")
            .map_or_else(Miss::into_view, |items| TabView::Items { items });
        let patterns = searched(&snapshot.patterns, filter, "patterns")
            .map_or_else(Miss::into_view, |items| TabView::Items { items });
        let examples = searched(&snapshot.code_examples, filter, "code examples").map_or_else(
            Miss::into_view,
            |items| {
                let sections = snapshot.sections.as_deref().unwrap_or(&[]);
                TabView::Items { items: group_examples(sections, items) }
            },
        );
        let timing = match &snapshot.timing {
            Ok(records) => TabView::Items { items: group_timing(records) },
            Err(_) => Miss::Failed("Failed to load timing".to_string()).into_view(),
        };

        Self {
            query: filter.map(|f| f.query().to_string()),
            addressing,
            patterns,
            examples,
            timing,
        }
    }
}

/// Group examples under their sections in section order; examples with a
/// missing or dangling section go last under "No section"
pub fn group_examples(sections: &[Section], examples: Vec<CodeExample>) -> Vec<ExampleGroup> {
    let mut groups: Vec<ExampleGroup> = sections
        .iter()
        .map(|s| ExampleGroup {
            section: Some(SectionSummary {
                id: s.id,
                slug: s.slug.clone(),
                title: s.title.clone(),
            }),
            title: s.title.clone(),
            examples: Vec::new(),
        })
        .collect();
    let mut orphans = Vec::new();

    for example in examples {
        let slot = example.section_id.and_then(|id| {
            groups
                .iter_mut()
                .find(|g| g.section.as_ref().is_some_and(|s| s.id == id))
        });
        match slot {
            Some(group) => group.examples.push(example),
            None => orphans.push(example),
        }
    }

    groups.retain(|g| !g.examples.is_empty());
    if !orphans.is_empty() {
        groups.push(ExampleGroup {
            section: None,
            title: NO_SECTION.to_string(),
            examples: orphans,
        });
    }
    groups
}

/// Merge records that share a category, keeping first-appearance order
/// and concatenating details in record order
pub fn group_timing(records: &[Timing]) -> Vec<TimingGroup> {
    let mut groups: Vec<TimingGroup> = Vec::new();
    for record in records {
        match groups.iter_mut().find(|g| g.category == record.category) {
            Some(group) => group.details.extend(record.details.iter().cloned()),
            None => groups.push(TimingGroup {
                category: record.category.clone(),
                details: record.details.clone(),
            }),
        }
    }
    groups
}

/// A section with its own examples, for `/sections/:slug`
#[derive(Debug, Clone, Serialize)]
pub struct SectionPage {
    pub section: Section,
    pub examples: Vec<CodeExample>,
}

impl SectionPage {
    pub fn new(section: Section, examples: &[CodeExample]) -> Self {
        let examples = examples
            .iter()
            .filter(|e| e.section_id == Some(section.id))
            .cloned()
            .collect();
        Self { section, examples }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn timing(category: &str, details: &[&str], order: i32) -> Timing {
        Timing {
            id: Uuid::new_v4(),
            category: category.into(),
            details: details.iter().map(|d| d.to_string()).collect(),
            order,
        }
    }

    fn section(slug: &str, order: i32) -> Section {
        Section {
            id: Uuid::new_v4(),
            title: slug.to_uppercase(),
            description: String::new(),
            order,
            slug: slug.into(),
        }
    }

    fn example(title: &str, section_id: Option<Uuid>) -> CodeExample {
        CodeExample {
            id: Uuid::new_v4(),
            title: title.into(),
            code: format!("{}:", title),
            description: None,
            section_id,
            order: 1,
        }
    }

    fn snapshot() -> ContentSnapshot {
        ContentSnapshot {
            sections: Ok(vec![]),
            addressing_modes: Ok(vec![AddressingMode {
                id: Uuid::new_v4(),
                title: "Immediate addressing".into(),
                syntax: "MOV A, #data".into(),
                description: "Constant in the instruction".into(),
                example: "MOV A, #55h".into(),
                order: 1,
            }]),
            patterns: Err(StoreError::QueryError("boom".into())),
            code_examples: Ok(vec![]),
            timing: Ok(vec![timing("Jumps", &["2 cycles"], 1)]),
        }
    }

    #[test]
    fn shared_categories_merge_in_record_order() {
        let groups = group_timing(&[
            timing("Jumps", &["2 cycles"], 1),
            timing("Basics", &["12 periods"], 2),
            timing("Jumps", &["3 cycles"], 3),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Jumps");
        assert_eq!(groups[0].details, vec!["2 cycles", "3 cycles"]);
        assert_eq!(groups[1].details, vec!["12 periods"]);
    }

    #[test]
    fn examples_group_by_section_with_orphans_last() {
        let arith = section("arithmetic", 1);
        let arrays = section("arrays", 2);
        let groups = group_examples(
            &[arith.clone(), arrays.clone()],
            vec![
                example("avg", Some(arrays.id)),
                example("lost", Some(Uuid::new_v4())),
                example("crc", Some(arith.id)),
                example("none", None),
            ],
        );

        let titles: Vec<_> = groups.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, ["ARITHMETIC", "ARRAYS", NO_SECTION]);
        assert_eq!(groups[2].examples.len(), 2);
        assert!(groups[2].section.is_none());
    }

    #[test]
    fn failed_reads_render_error_not_empty() {
        let view = DocsView::build(&snapshot(), None);
        assert!(matches!(view.patterns, TabView::Error { .. }));
        assert_eq!(view.addressing.items().unwrap().len(), 1);
        // no examples and no filter is an empty list, not "no results"
        assert_eq!(view.examples.items().unwrap().len(), 0);
    }

    #[test]
    fn unmatched_filter_renders_no_results_and_timing_is_untouched() {
        let view = DocsView::build(&snapshot(), Some("DJNZ"));
        assert_eq!(view.query.as_deref(), Some("djnz"));
        match &view.addressing {
            TabView::NoResults { message } => assert!(message.contains("djnz")),
            other => panic!("expected no results, got {:?}", other),
        }
        assert_eq!(view.timing.items().unwrap()[0].details, vec!["2 cycles"]);
    }

    #[test]
    fn section_page_keeps_only_its_examples() {
        let arith = section("arithmetic", 1);
        let page = SectionPage::new(
            arith.clone(),
            &[example("crc", Some(arith.id)), example("avg", None)],
        );
        assert_eq!(page.examples.len(), 1);
        assert_eq!(page.examples[0].title, "crc");
    }
}
