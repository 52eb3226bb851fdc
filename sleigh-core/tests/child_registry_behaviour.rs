//! Behavioural tests for `ChildStore` and the good-children counters.

use std::{cell::RefCell, sync::Arc};

use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use sleigh_core::{
    Behaviour, Child, ChildRequest, ChildStore, Coordinates, ErrorKind, LocationId,
    LocationRequest, LocationStore, MemoryDocumentStore, RegistryError,
};

#[derive(Debug)]
struct ChildWorld {
    children: ChildStore<MemoryDocumentStore>,
    outcome: RefCell<Option<Result<Child, RegistryError>>>,
}

impl ChildWorld {
    fn location_id(&self, name: &str) -> LocationId {
        self.children
            .locations()
            .find_by_name(name)
            .expect("lookup")
            .expect("location should exist")
            .id
    }

    fn register(&self, behaviour: &str, name: String, location: &str) -> Result<Child, RegistryError> {
        let request = ChildRequest {
            name,
            behaviour: Some(behaviour.to_owned()),
            location_id: Some(self.location_id(location).to_string()),
        };
        self.children.create(&request)
    }
}

#[fixture]
fn world() -> ChildWorld {
    let locations = LocationStore::new(Arc::new(MemoryDocumentStore::new()));
    ChildWorld {
        children: ChildStore::new(locations),
        outcome: RefCell::new(None),
    }
}

#[given("a location {name} at {lat}, {lon}")]
fn given_location(world: &ChildWorld, name: String, lat: f64, lon: f64) {
    world
        .children
        .locations()
        .create(&LocationRequest::new(name, Coordinates::new(lat, lon)))
        .expect("seed location");
}

#[given("a {behaviour} child named {name} is registered at {location}")]
fn given_child(world: &ChildWorld, behaviour: String, name: String, location: String) {
    world
        .register(&behaviour, name, &location)
        .expect("seed child");
}

#[when("I register a {behaviour} child named {name} at {location}")]
fn when_register(world: &ChildWorld, behaviour: String, name: String, location: String) {
    let outcome = world.register(&behaviour, name, &location);
    world.outcome.replace(Some(outcome));
}

#[when("I submit child {name} with behaviour {behaviour} and location id {location_id}")]
fn when_submit(world: &ChildWorld, name: String, behaviour: String, location_id: String) {
    let request = ChildRequest {
        name,
        behaviour: Some(behaviour),
        location_id: Some(location_id),
    };
    let outcome = world.children.create(&request);
    world.outcome.replace(Some(outcome));
}

#[then("the child is registered")]
fn then_registered(world: &ChildWorld) {
    let outcome = world.outcome.borrow();
    let child = outcome
        .as_ref()
        .expect("a registration should be recorded")
        .as_ref()
        .expect("registration should succeed");
    assert_eq!(child.locations.len(), 1);
}

#[then("the child registration fails with {kind}")]
fn then_fails(world: &ChildWorld, kind: String) {
    let expected = match kind.as_str() {
        "validation" => ErrorKind::Validation,
        "conflict" => ErrorKind::Conflict,
        "not-found" => ErrorKind::NotFound,
        other => panic!("unknown error kind {other}"),
    };
    let outcome = world.outcome.borrow();
    let err = outcome
        .as_ref()
        .expect("a registration should be recorded")
        .as_ref()
        .expect_err("registration should fail");
    assert_eq!(err.kind(), expected);
}

#[then("location {name} has {count} good children")]
fn then_counter(world: &ChildWorld, name: String, count: u64) {
    let location = world
        .children
        .locations()
        .find_by_name(&name)
        .expect("lookup")
        .expect("location should exist");
    assert_eq!(location.good_children_count, count);
}

#[then("the {behaviour} children are {names}")]
fn then_listed(world: &ChildWorld, behaviour: Behaviour, names: String) {
    let listed: Vec<String> = world
        .children
        .find_by_behaviour(behaviour)
        .expect("list children")
        .into_iter()
        .map(|child| child.name)
        .collect();
    let expected: Vec<String> = names.split(", ").map(str::to_owned).collect();
    assert_eq!(listed, expected);
}

#[scenario(path = "tests/features/child_registry.feature", index = 0)]
fn good_child_increments(world: ChildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/child_registry.feature", index = 1)]
fn bad_child_leaves_counter(world: ChildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/child_registry.feature", index = 2)]
fn unknown_location(world: ChildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/child_registry.feature", index = 3)]
fn unknown_behaviour(world: ChildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/child_registry.feature", index = 4)]
fn malformed_location_id(world: ChildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/child_registry.feature", index = 5)]
fn duplicate_child_names(world: ChildWorld) {
    let _ = world;
}

#[scenario(path = "tests/features/child_registry.feature", index = 6)]
fn children_listed_by_behaviour(world: ChildWorld) {
    let _ = world;
}
