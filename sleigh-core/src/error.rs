//! Error types raised by the registries and their backing stores.

use std::fmt;

use thiserror::Error;

use crate::{Child, LocationId};

/// Entities tracked by the registries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// A delivery location.
    Location,
    /// A registered child.
    Child,
}

impl EntityKind {
    /// Lowercase name used in error messages.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Child => "child",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Malformed or missing registration input.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// The name was empty or whitespace.
    #[error("{entity} name must not be empty")]
    EmptyName {
        /// Entity being registered.
        entity: EntityKind,
    },
    /// No coordinates were supplied for a location.
    #[error("location coordinates are required")]
    MissingCoordinates,
    /// Latitude outside `[-90, 90]`.
    #[error("latitude {lat} is outside [-90, 90]")]
    LatitudeOutOfRange {
        /// Rejected latitude.
        lat: f64,
    },
    /// Longitude outside `[-180, 180]`.
    #[error("longitude {lon} is outside [-180, 180]")]
    LongitudeOutOfRange {
        /// Rejected longitude.
        lon: f64,
    },
    /// No behaviour was supplied for a child.
    #[error("child behaviour is required")]
    MissingBehaviour,
    /// The behaviour was neither `good` nor `bad`.
    #[error("unknown behaviour {value:?}; expected \"good\" or \"bad\"")]
    UnknownBehaviour {
        /// Rejected input.
        value: String,
    },
    /// No location id was supplied for a child.
    #[error("a location id is required")]
    MissingLocationId,
    /// The location id could not be parsed.
    #[error("malformed location id {value:?}")]
    MalformedLocationId {
        /// Rejected input.
        value: String,
    },
}

/// Failures of the document store itself.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A previous writer panicked while holding the in-memory store lock.
    #[error("in-memory document store lock was poisoned")]
    Poisoned,
    /// A stored value could not be mapped back into the domain model.
    #[error("corrupt {entity} document {id}: {reason}")]
    Corrupt {
        /// Collection the document belongs to.
        entity: EntityKind,
        /// Raw identifier of the document.
        id: i64,
        /// Description of the problem.
        reason: &'static str,
    },
    /// Generic SQLite failure.
    #[cfg(feature = "store-sqlite")]
    #[error("database error: {source}")]
    Database {
        /// Source error raised by the SQLite driver.
        #[from]
        source: rusqlite::Error,
    },
}

/// Coarse classification of [`RegistryError`] used by request layers to pick
/// a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input.
    Validation,
    /// A uniqueness constraint was violated.
    Conflict,
    /// A referenced entity does not exist.
    NotFound,
    /// The child was stored but the location counter was not updated.
    StaleCounter,
    /// The store failed.
    Persistence,
}

/// Errors returned by the location and child registries.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Input failed validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// An entity with the same name already exists.
    #[error("{entity} named {name:?} already exists")]
    Conflict {
        /// Entity being registered.
        entity: EntityKind,
        /// Conflicting name.
        name: String,
    },
    /// A referenced entity does not exist.
    #[error("{entity} {id} not found")]
    NotFound {
        /// Entity that was looked up.
        entity: EntityKind,
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The child record was persisted but incrementing its location's
    /// good-children counter failed, leaving the counter stale.
    #[error(
        "child {:?} was stored but the good-children counter of location {location_id} was not updated: {source}",
        .child.name
    )]
    CounterNotUpdated {
        /// The persisted child.
        child: Box<Child>,
        /// Location whose counter is stale.
        location_id: LocationId,
        /// Why the increment failed.
        #[source]
        source: Box<RegistryError>,
    },
    /// The document store failed.
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl RegistryError {
    /// Classify the error for status-code mapping.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::CounterNotUpdated { .. } => ErrorKind::StaleCounter,
            Self::Persistence(_) => ErrorKind::Persistence,
        }
    }

    pub(crate) fn location_not_found(id: LocationId) -> Self {
        Self::NotFound {
            entity: EntityKind::Location,
            id: id.to_string(),
        }
    }
}
