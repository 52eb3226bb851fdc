//! Delivery locations and their good-children counters.

use std::{fmt, str::FromStr};

use crate::{Coordinates, ValidationError};

/// Opaque identifier assigned to a location by the document store.
///
/// # Examples
/// ```
/// use sleigh_core::LocationId;
///
/// let id: LocationId = "42".parse()?;
/// assert_eq!(id, LocationId::new(42));
/// assert_eq!(id.to_string(), "42");
/// # Ok::<(), sleigh_core::ValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct LocationId(u64);

impl LocationId {
    /// Wrap a raw identifier.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw identifier value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocationId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse()
            .map(Self)
            .map_err(|_| ValidationError::MalformedLocationId {
                value: s.to_owned(),
            })
    }
}

/// A registered delivery location.
///
/// `good_children_count` is maintained eagerly: it is incremented each time a
/// good child naming this location is registered and is never recomputed
/// from the child records.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Location {
    /// Store-assigned identifier.
    pub id: LocationId,
    /// Unique, non-empty name.
    pub name: String,
    /// Validated WGS84 position.
    pub coordinates: Coordinates,
    /// Number of good children registered against this location.
    pub good_children_count: u64,
}

/// Raw input for registering a location.
///
/// Fields mirror what a caller may omit; [`crate::LocationStore::create`]
/// turns omissions into [`ValidationError`]s.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct LocationRequest {
    /// Requested name.
    pub name: String,
    /// Requested position.
    pub coordinates: Option<Coordinates>,
}

impl LocationRequest {
    /// Build a request with both fields present.
    #[must_use]
    pub fn new(name: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            name: name.into(),
            coordinates: Some(coordinates),
        }
    }
}
