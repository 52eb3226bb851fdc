//! Test-only stores used by unit and behaviour tests.

use std::sync::Arc;

use crate::{
    Child, ChildDocument, ChildFilter, ChildId, ChildStore, DocumentStore, Location,
    LocationDocument, LocationFilter, LocationId, LocationStore, MemoryDocumentStore,
    PersistenceError, RouteEngine,
};

/// How [`StaleCounterStore`] fails counter increments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterFault {
    /// Report that no location matched.
    Unmatched,
    /// Fail with [`PersistenceError::Poisoned`].
    Poisoned,
}

/// Wraps a store and refuses every good-children increment.
///
/// All other operations delegate to the inner store, so children are still
/// persisted while location counters stay put.
#[derive(Debug)]
pub struct StaleCounterStore<S = MemoryDocumentStore> {
    inner: S,
    fault: CounterFault,
}

impl<S> StaleCounterStore<S> {
    /// Wrap `inner`, failing increments with `fault`.
    #[must_use]
    pub const fn new(inner: S, fault: CounterFault) -> Self {
        Self { inner, fault }
    }
}

impl<S: DocumentStore> DocumentStore for StaleCounterStore<S> {
    fn find_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>, PersistenceError> {
        self.inner.find_locations(filter)
    }

    fn insert_location(&self, document: &LocationDocument) -> Result<LocationId, PersistenceError> {
        self.inner.insert_location(document)
    }

    fn increment_good_children(
        &self,
        _filter: &LocationFilter,
        _delta: u64,
    ) -> Result<bool, PersistenceError> {
        match self.fault {
            CounterFault::Unmatched => Ok(false),
            CounterFault::Poisoned => Err(PersistenceError::Poisoned),
        }
    }

    fn find_children(&self, filter: &ChildFilter) -> Result<Vec<Child>, PersistenceError> {
        self.inner.find_children(filter)
    }

    fn insert_child(&self, document: &ChildDocument) -> Result<ChildId, PersistenceError> {
        self.inner.insert_child(document)
    }
}

/// The three services wired over one shared store.
#[derive(Debug)]
pub struct Registries<S> {
    /// Location registry.
    pub locations: LocationStore<S>,
    /// Child registry sharing the location registry.
    pub children: ChildStore<S>,
    /// Route engine reading the same locations.
    pub routes: RouteEngine<S>,
}

impl<S: DocumentStore> Registries<S> {
    /// Wire all services over `store`.
    #[must_use]
    pub fn new(store: S) -> Self {
        let locations = LocationStore::new(Arc::new(store));
        Self {
            children: ChildStore::new(locations.clone()),
            routes: RouteEngine::new(locations.clone()),
            locations,
        }
    }
}

impl Default for Registries<MemoryDocumentStore> {
    fn default() -> Self {
        Self::new(MemoryDocumentStore::new())
    }
}
