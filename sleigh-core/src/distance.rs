//! Great-circle distance between coordinates.

use geo::Point;

use crate::Coordinates;

/// Mean Earth radius, in kilometres, used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres using the haversine formula.
///
/// Inputs are not range checked; locations are validated when they are
/// registered. The result is symmetric and zero for identical inputs.
///
/// # Examples
/// ```
/// use sleigh_core::{Coordinates, distance_km};
///
/// let km = distance_km(Coordinates::new(0.0, 0.0), Coordinates::new(0.0, 1.0));
/// assert!((km - 111.19).abs() < 0.01);
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "the haversine formula is floating-point trigonometry"
)]
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
    let from = Point::from(a);
    let to = Point::from(b);

    let lat_from = from.y().to_radians();
    let lat_to = to.y().to_radians();
    let half_d_lat = (to.y() - from.y()).to_radians() / 2.0;
    let half_d_lon = (to.x() - from.x()).to_radians() / 2.0;

    let h = half_d_lat.sin().powi(2) + lat_from.cos() * lat_to.cos() * half_d_lon.sin().powi(2);
    let central_angle = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * central_angle
}

/// Sum of [`distance_km`] over each consecutive pair in `points`.
///
/// Fewer than two points yield `0.0`.
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "accumulating leg lengths from a positive zero"
)]
pub fn path_length_km<I>(points: I) -> f64
where
    I: IntoIterator<Item = Coordinates>,
{
    let stops: Vec<Coordinates> = points.into_iter().collect();
    stops
        .iter()
        .zip(stops.iter().skip(1))
        .map(|(from, to)| distance_km(*from, *to))
        .fold(0.0, |total, leg| total + leg)
}
