// filter/mod.rs - Case-insensitive substring search over content records

use crate::database::models::{AddressingMode, CodeExample, Pattern};

/// Records that take part in the docs search
pub trait Searchable {
    /// Text fields the filter is matched against
    fn search_fields(&self) -> Vec<&str>;
}

impl Searchable for AddressingMode {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.syntax.as_str()]
    }
}

impl Searchable for Pattern {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.title.as_str(), self.description.as_str(), self.code.as_str()]
    }
}

impl Searchable for CodeExample {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.title.as_str(), self.code.as_str()];
        if let Some(description) = &self.description {
            fields.push(description);
        }
        fields
    }
}

/// A lowercased query; blank input means no filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilter {
    needle: String,
}

impl SearchFilter {
    pub fn parse(query: Option<&str>) -> Option<Self> {
        let needle = query?.trim();
        if needle.is_empty() {
            return None;
        }
        Some(Self { needle: needle.to_lowercase() })
    }

    pub fn query(&self) -> &str {
        &self.needle
    }

    pub fn matches<T: Searchable>(&self, item: &T) -> bool {
        item.search_fields()
            .iter()
            .any(|field| field.to_lowercase().contains(&self.needle))
    }

    /// Keep matching items in their original order
    pub fn apply<T: Searchable + Clone>(&self, items: &[T]) -> Vec<T> {
        items.iter().filter(|item| self.matches(*item)).cloned().collect()
    }
}
