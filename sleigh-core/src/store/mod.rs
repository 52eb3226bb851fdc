//! The document store behind the location and child registries.
//!
//! [`DocumentStore`] is the persistence collaborator: two collections with
//! find, find-one, insert-one and an atomic counter increment. Registries hold
//! an explicit handle to a store built once at start-up; nothing here is
//! global.
//!
//! Two backends ship with the crate:
//! - [`MemoryDocumentStore`], guarded by a mutex, for tests and embedding.
//! - `SqliteDocumentStore` (feature `store-sqlite`), persisted with `rusqlite`.

use crate::{Behaviour, Child, ChildId, Coordinates, Location, LocationId, PersistenceError};

mod memory;
#[cfg(feature = "store-sqlite")]
mod sqlite;

pub use memory::MemoryDocumentStore;
#[cfg(feature = "store-sqlite")]
pub use sqlite::{SqliteDocumentStore, SqliteDocumentStoreError};

/// Selects documents from the locations collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationFilter {
    /// Every location.
    All,
    /// The location with this identifier.
    Id(LocationId),
    /// Locations whose identifier is in the list.
    Ids(Vec<LocationId>),
    /// Locations with exactly this name.
    Name(String),
}

impl LocationFilter {
    /// Whether `location` satisfies the filter.
    #[must_use]
    pub fn matches(&self, location: &Location) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => location.id == *id,
            Self::Ids(ids) => ids.contains(&location.id),
            Self::Name(name) => location.name == *name,
        }
    }
}

/// Selects documents from the children collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChildFilter {
    /// Every child.
    All,
    /// Children with exactly this name.
    Name(String),
    /// Children with this behaviour.
    Behaviour(Behaviour),
}

impl ChildFilter {
    /// Whether `child` satisfies the filter.
    #[must_use]
    pub fn matches(&self, child: &Child) -> bool {
        match self {
            Self::All => true,
            Self::Name(name) => child.name == *name,
            Self::Behaviour(behaviour) => child.behaviour == *behaviour,
        }
    }
}

/// A location document before the store assigns its identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDocument {
    /// Location name.
    pub name: String,
    /// Location position.
    pub coordinates: Coordinates,
    /// Initial counter value.
    pub good_children_count: u64,
}

impl LocationDocument {
    /// Attach a store-assigned identifier.
    #[must_use]
    pub fn into_location(self, id: LocationId) -> Location {
        Location {
            id,
            name: self.name,
            coordinates: self.coordinates,
            good_children_count: self.good_children_count,
        }
    }
}

/// A child document before the store assigns its identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildDocument {
    /// Child name.
    pub name: String,
    /// Recorded behaviour.
    pub behaviour: Behaviour,
    /// Linked locations.
    pub locations: Vec<LocationId>,
}

impl ChildDocument {
    /// Attach a store-assigned identifier.
    #[must_use]
    pub fn into_child(self, id: ChildId) -> Child {
        Child {
            id,
            name: self.name,
            behaviour: self.behaviour,
            locations: self.locations,
        }
    }
}

/// Persistence operations required by the registries.
///
/// Reads return documents in storage order, which is insertion order for
/// both shipped backends. Only [`DocumentStore::increment_good_children`]
/// must be atomic: it adds to the stored value in a single step so
/// concurrent increments never lose updates. Inserts perform no uniqueness
/// checks; registries check names before inserting.
///
/// # Examples
///
/// ```rust
/// use sleigh_core::{Coordinates, DocumentStore, LocationDocument, LocationFilter, MemoryDocumentStore};
///
/// # fn main() -> Result<(), sleigh_core::PersistenceError> {
/// let store = MemoryDocumentStore::default();
/// let id = store.insert_location(&LocationDocument {
///     name: "North Pole".into(),
///     coordinates: Coordinates::new(90.0, 0.0),
///     good_children_count: 0,
/// })?;
/// assert!(store.increment_good_children(&LocationFilter::Id(id), 2)?);
/// let found = store.find_one_location(&LocationFilter::Id(id))?;
/// assert_eq!(found.map(|l| l.good_children_count), Some(2));
/// # Ok(())
/// # }
/// ```
pub trait DocumentStore: Send + Sync {
    /// Return every location matching `filter`.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] when the backend fails.
    fn find_locations(&self, filter: &LocationFilter) -> Result<Vec<Location>, PersistenceError>;

    /// Return the first location matching `filter`.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] when the backend fails.
    fn find_one_location(
        &self,
        filter: &LocationFilter,
    ) -> Result<Option<Location>, PersistenceError> {
        Ok(self.find_locations(filter)?.into_iter().next())
    }

    /// Persist a new location and return its generated identifier.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] when the backend fails.
    fn insert_location(&self, document: &LocationDocument) -> Result<LocationId, PersistenceError>;

    /// Atomically add `delta` to the counter of the first location matching
    /// `filter`. Returns `false` when nothing matched.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] when the backend fails.
    fn increment_good_children(
        &self,
        filter: &LocationFilter,
        delta: u64,
    ) -> Result<bool, PersistenceError>;

    /// Return every child matching `filter`.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] when the backend fails.
    fn find_children(&self, filter: &ChildFilter) -> Result<Vec<Child>, PersistenceError>;

    /// Return the first child matching `filter`.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] when the backend fails.
    fn find_one_child(&self, filter: &ChildFilter) -> Result<Option<Child>, PersistenceError> {
        Ok(self.find_children(filter)?.into_iter().next())
    }

    /// Persist a new child and return its generated identifier.
    ///
    /// # Errors
    /// Returns [`PersistenceError`] when the backend fails.
    fn insert_child(&self, document: &ChildDocument) -> Result<ChildId, PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn location(id: u64, name: &str) -> Location {
        Location {
            id: LocationId::new(id),
            name: name.into(),
            coordinates: Coordinates::new(0.0, 0.0),
            good_children_count: 0,
        }
    }

    #[rstest]
    #[case(LocationFilter::All, true)]
    #[case(LocationFilter::Id(LocationId::new(1)), true)]
    #[case(LocationFilter::Id(LocationId::new(2)), false)]
    #[case(LocationFilter::Ids(vec![LocationId::new(3), LocationId::new(1)]), true)]
    #[case(LocationFilter::Ids(Vec::new()), false)]
    #[case(LocationFilter::Name("Lapland".into()), true)]
    #[case(LocationFilter::Name("lapland".into()), false)]
    fn location_filters_match(#[case] filter: LocationFilter, #[case] expected: bool) {
        assert_eq!(filter.matches(&location(1, "Lapland")), expected);
    }

    #[rstest]
    #[case(ChildFilter::All, true)]
    #[case(ChildFilter::Name("Tim".into()), true)]
    #[case(ChildFilter::Behaviour(Behaviour::Good), true)]
    #[case(ChildFilter::Behaviour(Behaviour::Bad), false)]
    fn child_filters_match(#[case] filter: ChildFilter, #[case] expected: bool) {
        let child = Child {
            id: ChildId::new(1),
            name: "Tim".into(),
            behaviour: Behaviour::Good,
            locations: vec![LocationId::new(1)],
        };
        assert_eq!(filter.matches(&child), expected);
    }
}
