//! Core domain for the Sleigh delivery planner.
//!
//! Two registries share one [`DocumentStore`]: [`LocationStore`] keeps
//! delivery locations and their good-children counters, while
//! [`ChildStore`] records children and bumps the counter of a good child's
//! location. [`RouteEngine`] reads the locations back, ranks them by counter
//! and measures the great-circle length of the resulting tour.
//!
//! Constructors and registrations return `Result` so invalid input is
//! surfaced before anything is written.

#![forbid(unsafe_code)]

mod child;
mod child_store;
mod coordinates;
mod distance;
mod error;
mod location;
mod location_store;
mod route;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use child::{Behaviour, Child, ChildId, ChildRequest, ResolvedChild};
pub use child_store::ChildStore;
pub use coordinates::{Coordinates, LATITUDE_RANGE, LONGITUDE_RANGE};
pub use distance::{EARTH_RADIUS_KM, distance_km, path_length_km};
pub use error::{EntityKind, ErrorKind, PersistenceError, RegistryError, ValidationError};
pub use location::{Location, LocationId, LocationRequest};
pub use location_store::LocationStore;
pub use route::{DeliveryRoute, RouteEngine, rank_by_good_children};
pub use store::{
    ChildDocument, ChildFilter, DocumentStore, LocationDocument, LocationFilter,
    MemoryDocumentStore,
};
#[cfg(feature = "store-sqlite")]
pub use store::{SqliteDocumentStore, SqliteDocumentStoreError};
