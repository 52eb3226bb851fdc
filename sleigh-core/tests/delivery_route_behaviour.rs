//! Behavioural tests for `RouteEngine` using rstest-bdd.

use std::{cell::RefCell, sync::Arc};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sleigh_core::{
    Coordinates, DeliveryRoute, LocationRequest, LocationStore, MemoryDocumentStore, RouteEngine,
};

const EPSILON_KM: f64 = 0.01;

#[derive(Debug)]
struct RouteWorld {
    locations: LocationStore<MemoryDocumentStore>,
    route: RefCell<Option<DeliveryRoute>>,
}

impl RouteWorld {
    fn with_route<T>(&self, f: impl FnOnce(&DeliveryRoute) -> T) -> T {
        let route = self.route.borrow();
        f(route.as_ref().expect("route should be planned"))
    }
}

#[fixture]
fn world() -> RouteWorld {
    RouteWorld {
        locations: LocationStore::new(Arc::new(MemoryDocumentStore::new())),
        route: RefCell::new(None),
    }
}

#[given("a location {name} at {lat}, {lon} with {count} good children")]
fn given_location(world: &RouteWorld, name: String, lat: f64, lon: f64, count: u64) {
    let location = world
        .locations
        .create(&LocationRequest::new(name, Coordinates::new(lat, lon)))
        .expect("seed location");
    for _ in 0..count {
        world
            .locations
            .increment_good_count(location.id)
            .expect("increment counter");
    }
}

#[when("I plan the delivery route")]
fn when_plan(world: &RouteWorld) {
    let engine = RouteEngine::new(world.locations.clone());
    let route = engine.plan().expect("plan route");
    let total = engine.total_route_distance().expect("route distance");
    assert!((route.total_distance_km - total).abs() < f64::EPSILON);
    world.route.replace(Some(route));
}

#[then("the stops are {names}")]
fn then_stops(world: &RouteWorld, names: String) {
    let stops: Vec<String> =
        world.with_route(|route| route.stops.iter().map(|stop| stop.name.clone()).collect());
    let expected: Vec<String> = names.split(", ").map(str::to_owned).collect();
    assert_eq!(stops, expected);
}

#[then("the route has no stops")]
fn then_no_stops(world: &RouteWorld) {
    assert!(world.with_route(|route| route.stops.is_empty()));
}

#[then("the total distance is {km} km")]
fn then_distance(world: &RouteWorld, km: f64) {
    let total = world.with_route(|route| route.total_distance_km);
    assert!((total - km).abs() < EPSILON_KM, "total {total} km, expected {km} km");
}

#[scenario(path = "tests/features/delivery_route.feature", index = 0)]
fn ranked_by_good_children(world: RouteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/delivery_route.feature", index = 1)]
fn ties_keep_registration_order(world: RouteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/delivery_route.feature", index = 2)]
fn empty_registry(world: RouteWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/delivery_route.feature", index = 3)]
fn single_location(world: RouteWorld) {
    let _ = world;
}
