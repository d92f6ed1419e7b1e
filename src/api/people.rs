//! The people registry the detail route checks ids against.

use std::collections::BTreeSet;

/// Answers whether a person id is known. Handlers only ever ask about
/// membership; nothing is read or written beyond that.
pub trait PeopleRepository: Send + Sync {
    fn exists(&self, person_id: i64) -> bool;
}

/// A fixed set of ids, built once at startup and never mutated.
#[derive(Clone, Debug)]
pub struct InMemoryPeople {
    ids: BTreeSet<i64>,
}

impl InMemoryPeople {
    pub fn new(ids: impl IntoIterator<Item = i64>) -> Self {
        Self { ids: ids.into_iter().collect() }
    }

    pub fn len(&self) -> usize { self.ids.len() }
    pub fn is_empty(&self) -> bool { self.ids.is_empty() }
}

impl Default for InMemoryPeople {
    /// Ids `0` through `4`.
    fn default() -> Self {
        Self::new(0..=4)
    }
}

impl PeopleRepository for InMemoryPeople {
    fn exists(&self, person_id: i64) -> bool {
        self.ids.contains(&person_id)
    }
}
