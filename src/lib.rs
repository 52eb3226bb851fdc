//! Facade crate for the Sleigh delivery planner.
//!
//! This crate re-exports the core domain types and exposes the SQLite store
//! behind a feature flag.

#![forbid(unsafe_code)]

pub use sleigh_core::{
    Behaviour, Child, ChildId, ChildRequest, ChildStore, Coordinates, DeliveryRoute,
    DocumentStore, EntityKind, ErrorKind, Location, LocationId, LocationRequest, LocationStore,
    MemoryDocumentStore, PersistenceError, RegistryError, ResolvedChild, RouteEngine,
    ValidationError, distance_km,
};

#[cfg(feature = "store-sqlite")]
pub use sleigh_core::{SqliteDocumentStore, SqliteDocumentStoreError};

#[cfg(feature = "test-support")]
pub use sleigh_core::test_support;
