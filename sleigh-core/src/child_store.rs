//! Registry of children and the write path that maintains location counters.

use std::sync::Arc;

use log::{info, warn};

use crate::{
    Behaviour, Child, ChildDocument, ChildFilter, ChildRequest, DocumentStore, EntityKind,
    LocationId, LocationStore, RegistryError, ResolvedChild, ValidationError,
};

/// Façade over the children collection.
///
/// [`ChildStore::create`] is the single place that increments a location's
/// good-children counter. Counters are a cache maintained on write; nothing
/// recomputes them from the child records.
#[derive(Debug)]
pub struct ChildStore<S> {
    store: Arc<S>,
    locations: LocationStore<S>,
}

impl<S> Clone for ChildStore<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            locations: self.locations.clone(),
        }
    }
}

impl<S: DocumentStore> ChildStore<S> {
    /// Build a child registry sharing the location registry's store.
    #[must_use]
    pub fn new(locations: LocationStore<S>) -> Self {
        Self {
            store: Arc::clone(locations.store()),
            locations,
        }
    }

    /// The location registry used to resolve and update locations.
    #[must_use]
    pub const fn locations(&self) -> &LocationStore<S> {
        &self.locations
    }

    /// Validate and persist a child linked to one existing location.
    ///
    /// For a good child the location's counter is incremented after the
    /// child record is written. The two writes are not atomic together: if
    /// the increment fails the child stays persisted and
    /// [`RegistryError::CounterNotUpdated`] carries it back to the caller.
    ///
    /// # Errors
    /// - [`RegistryError::Validation`] for a blank name, missing or unknown
    ///   behaviour, or a missing or malformed location id.
    /// - [`RegistryError::NotFound`] when the location does not exist.
    /// - [`RegistryError::Conflict`] when the name is already registered.
    /// - [`RegistryError::CounterNotUpdated`] when the child was stored but
    ///   the counter increment failed.
    /// - [`RegistryError::Persistence`] when the store fails before the child
    ///   is stored.
    pub fn create(&self, request: &ChildRequest) -> Result<Child, RegistryError> {
        let (behaviour, location_id) = validate(request)?;

        if self.locations.find_by_id(location_id)?.is_none() {
            return Err(RegistryError::location_not_found(location_id));
        }
        if self.find_by_name(&request.name)?.is_some() {
            return Err(RegistryError::Conflict {
                entity: EntityKind::Child,
                name: request.name.clone(),
            });
        }

        let document = ChildDocument {
            name: request.name.clone(),
            behaviour,
            locations: vec![location_id],
        };
        let id = self.store.insert_child(&document)?;
        let child = document.into_child(id);
        info!(
            "registered {} child {id} ({:?}) at location {location_id}",
            child.behaviour, child.name
        );

        if child.behaviour == Behaviour::Good {
            if let Err(source) = self.locations.increment_good_count(location_id) {
                warn!(
                    "child {id} stored but counter of location {location_id} is stale: {source}"
                );
                return Err(RegistryError::CounterNotUpdated {
                    child: Box::new(child),
                    location_id,
                    source: Box::new(source),
                });
            }
        }
        Ok(child)
    }

    /// Look a child up by its exact name.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn find_by_name(&self, name: &str) -> Result<Option<Child>, RegistryError> {
        Ok(self
            .store
            .find_one_child(&ChildFilter::Name(name.to_owned()))?)
    }

    /// Every child with `behaviour`, in storage order, with locations
    /// resolved.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn find_by_behaviour(
        &self,
        behaviour: Behaviour,
    ) -> Result<Vec<ResolvedChild>, RegistryError> {
        self.store
            .find_children(&ChildFilter::Behaviour(behaviour))?
            .into_iter()
            .map(|child| self.resolve(child))
            .collect()
    }

    fn resolve(&self, child: Child) -> Result<ResolvedChild, RegistryError> {
        let locations = self.locations.resolve(&child.locations)?;
        Ok(ResolvedChild {
            id: child.id,
            name: child.name,
            behaviour: child.behaviour,
            locations,
        })
    }
}

fn validate(request: &ChildRequest) -> Result<(Behaviour, LocationId), ValidationError> {
    if request.name.trim().is_empty() {
        return Err(ValidationError::EmptyName {
            entity: EntityKind::Child,
        });
    }
    let behaviour = present(request.behaviour.as_deref())
        .ok_or(ValidationError::MissingBehaviour)?
        .parse::<Behaviour>()?;
    let location_id = present(request.location_id.as_deref())
        .ok_or(ValidationError::MissingLocationId)?
        .parse::<LocationId>()?;
    Ok((behaviour, location_id))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|raw| !raw.trim().is_empty())
}
