//! Delivery routes ranked by good-children counters.
//!
//! The route visits every location once, in descending order of its
//! good-children counter, and reports the great-circle length of that tour.
//! No attempt is made to shorten the tour.

use std::cmp::Reverse;

use crate::{DocumentStore, Location, LocationStore, RegistryError, distance_km, path_length_km};

/// An ordered tour through delivery locations with its length.
///
/// # Examples
/// ```
/// use sleigh_core::DeliveryRoute;
///
/// let route = DeliveryRoute::from_stops(Vec::new());
/// assert!(route.stops.is_empty());
/// assert_eq!(route.total_distance_km, 0.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct DeliveryRoute {
    /// Locations in visiting order.
    pub stops: Vec<Location>,
    /// Great-circle length of each leg, in kilometres.
    pub legs_km: Vec<f64>,
    /// Sum of `legs_km`.
    pub total_distance_km: f64,
}

impl DeliveryRoute {
    /// Measure a tour visiting `stops` in the given order.
    #[must_use]
    pub fn from_stops(stops: Vec<Location>) -> Self {
        let legs_km = stops
            .iter()
            .zip(stops.iter().skip(1))
            .map(|(from, to)| distance_km(from.coordinates, to.coordinates))
            .collect();
        let total_distance_km = path_length_km(stops.iter().map(|stop| stop.coordinates));
        Self {
            stops,
            legs_km,
            total_distance_km,
        }
    }
}

/// Order locations by good-children counter, highest first.
///
/// The sort is stable: locations with equal counters keep their input order.
#[must_use]
pub fn rank_by_good_children(mut locations: Vec<Location>) -> Vec<Location> {
    locations.sort_by_key(|location| Reverse(location.good_children_count));
    locations
}

/// Read side of the delivery plan.
///
/// Every call reads the current locations from the store; nothing is cached.
#[derive(Debug)]
pub struct RouteEngine<S> {
    locations: LocationStore<S>,
}

impl<S> Clone for RouteEngine<S> {
    fn clone(&self) -> Self {
        Self {
            locations: self.locations.clone(),
        }
    }
}

impl<S: DocumentStore> RouteEngine<S> {
    /// Build an engine reading through `locations`.
    #[must_use]
    pub const fn new(locations: LocationStore<S>) -> Self {
        Self { locations }
    }

    /// All locations by descending good-children counter; ties keep storage
    /// order.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn ranked_locations(&self) -> Result<Vec<Location>, RegistryError> {
        Ok(rank_by_good_children(self.locations.list_all()?))
    }

    /// Length in kilometres of the tour through [`Self::ranked_locations`].
    ///
    /// Zero for fewer than two locations.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn total_route_distance(&self) -> Result<f64, RegistryError> {
        let ranked = self.ranked_locations()?;
        Ok(path_length_km(ranked.iter().map(|stop| stop.coordinates)))
    }

    /// Ranked stops and distances from a single read of the store.
    ///
    /// # Errors
    /// Returns [`RegistryError::Persistence`] when the store fails.
    pub fn plan(&self) -> Result<DeliveryRoute, RegistryError> {
        Ok(DeliveryRoute::from_stops(self.ranked_locations()?))
    }
}
