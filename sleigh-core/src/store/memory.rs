//! In-process document store.

use std::sync::{Mutex, MutexGuard};

use crate::{Child, ChildId, Location, LocationId, PersistenceError};

use super::{ChildDocument, ChildFilter, DocumentStore, LocationDocument, LocationFilter};

/// `DocumentStore` kept in process memory.
///
/// Every operation holds one mutex for its duration, so increments are
/// atomic. Reads perform a linear scan and are intended for small datasets.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    locations: Vec<Location>,
    children: Vec<Child>,
    last_location_id: u64,
    last_child_id: u64,
}

impl MemoryDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>, PersistenceError> {
        self.state.lock().map_err(|_| PersistenceError::Poisoned)
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn find_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>, PersistenceError> {
        let state = self.lock()?;
        Ok(state
            .locations
            .iter()
            .filter(|location| filter.matches(location))
            .cloned()
            .collect())
    }

    fn insert_location(&self, document: &LocationDocument) -> Result<LocationId, PersistenceError> {
        let mut state = self.lock()?;
        state.last_location_id += 1;
        let id = LocationId::new(state.last_location_id);
        state.locations.push(document.clone().into_location(id));
        Ok(id)
    }

    fn increment_good_children(
        &self,
        filter: &LocationFilter,
        delta: u64,
    ) -> Result<bool, PersistenceError> {
        let mut state = self.lock()?;
        let Some(location) = state
            .locations
            .iter_mut()
            .find(|location| filter.matches(location))
        else {
            return Ok(false);
        };
        location.good_children_count = location.good_children_count.saturating_add(delta);
        Ok(true)
    }

    fn find_children(&self, filter: &ChildFilter) -> Result<Vec<Child>, PersistenceError> {
        let state = self.lock()?;
        Ok(state
            .children
            .iter()
            .filter(|child| filter.matches(child))
            .cloned()
            .collect())
    }

    fn insert_child(&self, document: &ChildDocument) -> Result<ChildId, PersistenceError> {
        let mut state = self.lock()?;
        state.last_child_id += 1;
        let id = ChildId::new(state.last_child_id);
        state.children.push(document.clone().into_child(id));
        Ok(id)
    }
}
