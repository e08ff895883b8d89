use serde::Serialize;
use uuid::Uuid;

use crate::database::models::{Entity, MAX_ORDER};
use crate::database::StoreError;

/// In-memory copy of one kind's records, kept sorted by `order`.
///
/// A failed load is recorded in `error` and leaves `items` empty, so an
/// errored collection is never mistaken for an empty table.
#[derive(Debug, Clone, Serialize)]
pub struct Collection<T> {
    items: Vec<T>,
    error: Option<String>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self { items: Vec::new(), error: None }
    }
}

impl<T: Entity> Collection<T> {
    pub fn from_result(result: Result<Vec<T>, StoreError>) -> Self {
        match result {
            Ok(items) => {
                let mut collection = Self { items, error: None };
                collection.resort();
                collection
            }
            Err(_) => Self {
                items: Vec::new(),
                error: Some(format!("Failed to load {}", T::KIND)),
            },
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn get(&self, id: Uuid) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// `max(order) + 1`, or 1 for an empty collection; `None` once the
    /// highest order leaves no room above it
    pub fn next_order(&self) -> Option<i32> {
        let next = self.items.iter().map(|item| item.order()).max().unwrap_or(0).checked_add(1)?;
        (next <= MAX_ORDER).then_some(next)
    }

    pub fn apply_created(&mut self, item: T) {
        self.items.push(item);
        self.resort();
    }

    /// Replace by id, inserting when the collection did not hold it
    pub fn apply_updated(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.push(item),
        }
        self.resort();
    }

    pub fn apply_deleted(&mut self, id: Uuid) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        self.items.len() != before
    }

    // stable: equal orders keep their relative position
    fn resort(&mut self) {
        self.items.sort_by_key(|item| item.order());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::Pattern;

    fn pattern(title: &str, order: i32) -> Pattern {
        Pattern {
            id: Uuid::new_v4(),
            title: title.into(),
            code: "NOP".into(),
            description: String::new(),
            order,
        }
    }

    fn titles(collection: &Collection<Pattern>) -> Vec<&str> {
        collection.items().iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn next_order_starts_at_one() {
        let mut collection = Collection::default();
        assert_eq!(collection.next_order(), Some(1));
        collection.apply_created(pattern("a", 7));
        collection.apply_created(pattern("b", 3));
        assert_eq!(collection.next_order(), Some(8));
    }

    #[test]
    fn next_order_runs_out_instead_of_overflowing() {
        let mut collection = Collection::from_result(Ok(vec![pattern("a", MAX_ORDER - 1)]));
        assert_eq!(collection.next_order(), Some(MAX_ORDER));

        collection.apply_created(pattern("b", MAX_ORDER));
        assert_eq!(collection.next_order(), None);

        collection.apply_created(pattern("c", i32::MAX));
        assert_eq!(collection.next_order(), None);
    }

    #[test]
    fn created_items_land_after_existing_ties() {
        let mut collection = Collection::from_result(Ok(vec![
            pattern("a", 2),
            pattern("b", 1),
            pattern("c", 2),
        ]));
        assert_eq!(titles(&collection), ["b", "a", "c"]);

        collection.apply_created(pattern("d", 2));
        collection.apply_created(pattern("e", 1));
        assert_eq!(titles(&collection), ["b", "e", "a", "c", "d"]);
    }

    #[test]
    fn updates_resort_and_keep_ties_stable() {
        let mut collection = Collection::from_result(Ok(vec![
            pattern("a", 1),
            pattern("b", 2),
            pattern("c", 2),
        ]));
        let mut moved = collection.items()[0].clone();
        moved.order = 5;
        collection.apply_updated(moved);
        assert_eq!(titles(&collection), ["b", "c", "a"]);

        let unknown = pattern("d", 2);
        collection.apply_updated(unknown);
        assert_eq!(titles(&collection), ["b", "c", "d", "a"]);
    }

    #[test]
    fn delete_reports_whether_an_item_was_removed() {
        let first = pattern("a", 1);
        let mut collection = Collection::from_result(Ok(vec![first.clone()]));
        assert!(collection.apply_deleted(first.id));
        assert!(!collection.apply_deleted(first.id));
        assert!(collection.items().is_empty());
    }

    #[test]
    fn failed_load_is_not_an_empty_table() {
        let collection: Collection<Pattern> =
            Collection::from_result(Err(StoreError::QueryError("timeout".into())));
        assert!(collection.items().is_empty());
        assert_eq!(collection.error(), Some("Failed to load patterns"));
    }
}
