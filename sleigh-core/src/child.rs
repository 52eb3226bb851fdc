//! Children, their behaviour and their location links.

use std::{fmt, str::FromStr};

use crate::{Location, LocationId, ValidationError};

/// Opaque identifier assigned to a child by the document store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ChildId(u64);

impl ChildId {
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

impl fmt::Display for ChildId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a child behaved this year.
///
/// # Examples
/// ```
/// use sleigh_core::Behaviour;
///
/// assert_eq!("good".parse::<Behaviour>()?, Behaviour::Good);
/// assert_eq!(Behaviour::Bad.as_str(), "bad");
/// # Ok::<(), sleigh_core::ValidationError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Behaviour {
    /// Counts towards the location's good-children counter.
    Good,
    /// Recorded, but leaves counters untouched.
    Bad,
}

impl Behaviour {
    /// Lowercase wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Good => "good",
            Self::Bad => "bad",
        }
    }
}

impl fmt::Display for Behaviour {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Behaviour {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "good" => Ok(Self::Good),
            "bad" => Ok(Self::Bad),
            other => Err(ValidationError::UnknownBehaviour {
                value: other.to_owned(),
            }),
        }
    }
}

/// A registered child.
///
/// `locations` holds identifiers only; resolve them through the location
/// registry rather than embedding [`Location`] values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Child {
    /// Store-assigned identifier.
    pub id: ChildId,
    /// Unique, non-empty name.
    pub name: String,
    /// Recorded behaviour.
    pub behaviour: Behaviour,
    /// Linked locations, without duplicates, in link order.
    pub locations: Vec<LocationId>,
}

/// A child with its location links resolved.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ResolvedChild {
    /// Store-assigned identifier.
    pub id: ChildId,
    /// Child name.
    pub name: String,
    /// Recorded behaviour.
    pub behaviour: Behaviour,
    /// Linked locations that still resolve, in storage order.
    pub locations: Vec<Location>,
}

/// Raw input for registering a child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ChildRequest {
    /// Requested name.
    pub name: String,
    /// Behaviour as text: `good` or `bad`.
    pub behaviour: Option<String>,
    /// Identifier of an existing location, as text.
    pub location_id: Option<String>,
}

impl ChildRequest {
    /// Build a request with every field present.
    #[must_use]
    pub fn new(name: impl Into<String>, behaviour: Behaviour, location_id: LocationId) -> Self {
        Self {
            name: name.into(),
            behaviour: Some(behaviour.as_str().to_owned()),
            location_id: Some(location_id.to_string()),
        }
    }
}
