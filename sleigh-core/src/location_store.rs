//! Registry of delivery locations.

use std::sync::Arc;

use log::{debug, info};

use crate::{
    DocumentStore, EntityKind, Location, LocationDocument, LocationFilter, LocationId,
    LocationRequest, RegistryError, ValidationError,
};

/// Façade over the locations collection.
///
/// The registry holds no state of its own; all reads and writes go to the
/// shared [`DocumentStore`]. Cloning is cheap and shares the store.
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use sleigh_core::{Coordinates, LocationRequest, LocationStore, MemoryDocumentStore};
///
/// # fn main() -> Result<(), sleigh_core::RegistryError> {
/// let locations = LocationStore::new(Arc::new(MemoryDocumentStore::new()));
/// let pole = locations.create(&LocationRequest::new("North Pole", Coordinates::new(90.0, 0.0)))?;
/// assert_eq!(pole.good_children_count, 0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct LocationStore<S> {
    store: Arc<S>,
}

impl<S> Clone for LocationStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> LocationStore<S> {
    /// Wrap a shared document store.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Shared handle to the underlying store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Validate and persist a new location with a zero counter.
    ///
    /// The name check and the insert are separate store calls; two concurrent
    /// registrations of the same name can both succeed.
    ///
    /// # Errors
    /// - [`RegistryError::Validation`] for a blank name, missing coordinates
    ///   or coordinates out of range.
    /// - [`RegistryError::Conflict`] when the name is already registered.
    /// - [`RegistryError::Persistence`] when the store fails.
    pub fn create(&self, request: &LocationRequest) -> Result<Location, RegistryError> {
        if request.name.trim().is_empty() {
            return Err(ValidationError::EmptyName {
                entity: EntityKind::Location,
            }
            .into());
        }
        let coordinates = request
            .coordinates
            .ok_or(ValidationError::MissingCoordinates)?
            .validate()?;

        if self.find_by_name(&request.name)?.is_some() {
            return Err(RegistryError::Conflict {
                entity: EntityKind::Location,
                name: request.name.clone(),
            });
        }

        let document = LocationDocument {
            name: request.name.clone(),
            coordinates,
            good_children_count: 0,
        };
        let id = self.store.insert_location(&document)?;
        info!("registered location {id} ({:?})", document.name);
        Ok(document.into_location(id))
    }

    /// Look a location up by its exact name.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Location>, RegistryError> {
        Ok(self
            .store
            .find_one_location(&LocationFilter::Name(name.to_owned()))?)
    }

    /// Look a location up by identifier.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn find_by_id(&self, id: LocationId) -> Result<Option<Location>, RegistryError> {
        Ok(self.store.find_one_location(&LocationFilter::Id(id))?)
    }

    /// Atomically add one to the location's good-children counter.
    ///
    /// This is the only mutation a location ever sees.
    ///
    /// # Errors
    /// - [`RegistryError::NotFound`] when no location has this id.
    /// - [`RegistryError::Persistence`] when the store fails.
    pub fn increment_good_count(&self, id: LocationId) -> Result<(), RegistryError> {
        if self
            .store
            .increment_good_children(&LocationFilter::Id(id), 1)?
        {
            debug!("incremented good-children counter of location {id}");
            Ok(())
        } else {
            Err(RegistryError::location_not_found(id))
        }
    }

    /// Every location in storage order.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn list_all(&self) -> Result<Vec<Location>, RegistryError> {
        Ok(self.store.find_locations(&LocationFilter::All)?)
    }

    /// Resolve a set of identifiers; ids that no longer resolve are skipped.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn resolve(&self, ids: &[LocationId]) -> Result<Vec<Location>, RegistryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .store
            .find_locations(&LocationFilter::Ids(ids.to_vec()))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Coordinates, MemoryDocumentStore};
    use rstest::{fixture, rstest};

    #[fixture]
    fn locations() -> LocationStore<MemoryDocumentStore> {
        LocationStore::new(Arc::new(MemoryDocumentStore::new()))
    }

    fn request(name: &str, lat: f64, lon: f64) -> LocationRequest {
        LocationRequest::new(name, Coordinates::new(lat, lon))
    }

    #[rstest]
    fn new_locations_start_with_zero_good_children(locations: LocationStore<MemoryDocumentStore>) {
        let pole = locations
            .create(&request("North Pole", 90.0, 0.0))
            .expect("create location");
        assert_eq!(pole.good_children_count, 0);
        assert_eq!(pole.name, "North Pole");
        let stored = locations
            .find_by_id(pole.id)
            .expect("lookup")
            .expect("stored");
        assert_eq!(stored, pole);
    }

    #[rstest]
    #[case(95.0, 0.0)]
    #[case(0.0, -200.0)]
    fn rejects_out_of_range_coordinates(
        locations: LocationStore<MemoryDocumentStore>,
        #[case] lat: f64,
        #[case] lon: f64,
    ) {
        let err = locations
            .create(&request("Nowhere", lat, lon))
            .expect_err("coordinates out of range");
        assert!(matches!(err, RegistryError::Validation(_)));
        assert!(locations.list_all().expect("list").is_empty());
    }

    #[rstest]
    #[case(LocationRequest { name: String::new(), coordinates: Some(Coordinates::new(0.0, 0.0)) })]
    #[case(LocationRequest { name: "   ".into(), coordinates: Some(Coordinates::new(0.0, 0.0)) })]
    #[case(LocationRequest { name: "Lapland".into(), coordinates: None })]
    fn rejects_incomplete_requests(
        locations: LocationStore<MemoryDocumentStore>,
        #[case] request: LocationRequest,
    ) {
        let err = locations.create(&request).expect_err("incomplete request");
        assert!(matches!(err, RegistryError::Validation(_)));
    }

    #[rstest]
    fn accepts_the_equator_and_prime_meridian(locations: LocationStore<MemoryDocumentStore>) {
        assert!(locations.create(&request("Null Island", 0.0, 0.0)).is_ok());
    }

    #[rstest]
    fn rejects_duplicate_names(locations: LocationStore<MemoryDocumentStore>) {
        locations
            .create(&request("Lapland", 68.0, 27.0))
            .expect("first registration");
        let err = locations
            .create(&request("Lapland", 1.0, 1.0))
            .expect_err("duplicate name");
        assert!(matches!(
            err,
            RegistryError::Conflict {
                entity: EntityKind::Location,
                ..
            }
        ));
        assert_eq!(locations.list_all().expect("list").len(), 1);
    }

    #[rstest]
    fn increments_existing_locations(locations: LocationStore<MemoryDocumentStore>) {
        let id = locations
            .create(&request("Lapland", 68.0, 27.0))
            .expect("create")
            .id;
        locations.increment_good_count(id).expect("increment");
        locations.increment_good_count(id).expect("increment");
        let found = locations
            .find_by_name("Lapland")
            .expect("lookup")
            .expect("stored");
        assert_eq!(found.good_children_count, 2);
    }

    #[rstest]
    fn increment_of_unknown_location_is_not_found(locations: LocationStore<MemoryDocumentStore>) {
        let err = locations
            .increment_good_count(LocationId::new(42))
            .expect_err("unknown location");
        assert!(matches!(
            err,
            RegistryError::NotFound {
                entity: EntityKind::Location,
                ..
            }
        ));
    }

    #[rstest]
    fn resolves_only_existing_ids(locations: LocationStore<MemoryDocumentStore>) {
        let a = locations.create(&request("a", 1.0, 1.0)).expect("create").id;
        let resolved = locations
            .resolve(&[LocationId::new(77), a])
            .expect("resolve");
        assert_eq!(resolved.len(), 1);
        assert!(locations.resolve(&[]).expect("resolve").is_empty());
    }
}
