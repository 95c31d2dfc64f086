//! Candidate collections searched by id during resolution.

use std::collections::HashMap;

use crate::document::Identified;

/// A collection that can be searched for an entity by id.
///
/// When ids repeat, the entity earliest in collection order wins.
pub trait Lookup<T> {
    fn find(&self, id: &str) -> Option<&T>;
}

impl<T: Identified> Lookup<T> for [T] {
    fn find(&self, id: &str) -> Option<&T> {
        self.iter().find(|item| item.id() == id)
    }
}

impl<T: Identified> Lookup<T> for Vec<T> {
    fn find(&self, id: &str) -> Option<&T> {
        self.as_slice().find(id)
    }
}

/// An id → entity table over a borrowed slice.
///
/// Built once, then answers lookups in constant time. Same first-match rule as
/// a linear scan.
#[derive(Debug, Clone)]
pub struct IdIndex<'a, T> {
    items: &'a [T],
    positions: HashMap<&'a str, usize>,
}

impl<'a, T: Identified> IdIndex<'a, T> {
    /// Index `items` by id, keeping the first of any duplicates.
    pub fn new(items: &'a [T]) -> Self {
        let mut positions = HashMap::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            positions.entry(item.id()).or_insert(i);
        }
        Self { items, positions }
    }

    pub fn get(&self, id: &str) -> Option<&'a T> {
        self.positions.get(id).map(|&i| &self.items[i])
    }

    /// Number of distinct ids.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<T: Identified> Lookup<T> for IdIndex<'_, T> {
    fn find(&self, id: &str) -> Option<&T> {
        self.get(id)
    }
}
