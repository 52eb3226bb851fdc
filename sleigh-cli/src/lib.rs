//! Command-line interface and HTTP server for the Sleigh delivery planner.
#![forbid(unsafe_code)]

use std::io::Write;

use camino::Utf8Path;
use clap::{Parser, Subcommand};
use serde::Serialize;
use sleigh_core::SqliteDocumentStore;

mod error;
mod http;
mod registry;
mod report;
mod serve;

pub use error::CliError;

use registry::{ChildArgs, LocationArgs};
use report::{ChildrenArgs, DeliveriesArgs, RouteArgs};
use serve::ServeArgs;

const ARG_DATABASE: &str = "database";
const ARG_NAME: &str = "name";
const ARG_LAT: &str = "lat";
const ARG_LON: &str = "lon";
const ARG_BEHAVIOUR: &str = "behaviour";
const ARG_LOCATION_ID: &str = "location-id";
const ARG_BIND: &str = "bind";
const ENV_LOCATION_NAME: &str = "SLEIGH_CMDS_LOCATION_NAME";
const ENV_CHILD_NAME: &str = "SLEIGH_CMDS_CHILD_NAME";
const ENV_CHILDREN_BEHAVIOUR: &str = "SLEIGH_CMDS_CHILDREN_BEHAVIOUR";

const DEFAULT_DATABASE: &str = "sleigh.db";
const DEFAULT_BIND: &str = "0.0.0.0:6768";

/// Run the Sleigh CLI with the current process arguments and environment.
///
/// # Errors
/// Returns [`CliError`] when arguments or configuration are invalid, the
/// database cannot be opened, a registry operation fails, or output cannot
/// be written.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Location(args) => registry::run_location(args, &mut stdout),
        Command::Child(args) => registry::run_child(args, &mut stdout),
        Command::Children(args) => report::run_children(args, &mut stdout),
        Command::Deliveries(args) => report::run_deliveries(args, &mut stdout),
        Command::Route(args) => report::run_route(args, &mut stdout),
        Command::Serve(args) => serve::run_serve(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "sleigh",
    about = "Register children and locations and plan the delivery route",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Register a delivery location.
    Location(LocationArgs),
    /// Register a child at an existing location.
    Child(ChildArgs),
    /// List children with a given behaviour.
    Children(ChildrenArgs),
    /// List locations by descending good-children count.
    Deliveries(DeliveriesArgs),
    /// Report the length of the ranked delivery route.
    Route(RouteArgs),
    /// Serve the registries over HTTP.
    Serve(ServeArgs),
}

fn open_store(path: &Utf8Path) -> Result<SqliteDocumentStore, CliError> {
    SqliteDocumentStore::open(path).map_err(|source| CliError::OpenStore {
        path: path.to_path_buf(),
        source: Box::new(source),
    })
}

fn write_json<T: Serialize + ?Sized>(writer: &mut dyn Write, value: &T) -> Result<(), CliError> {
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerialiseOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

#[cfg(test)]
mod tests;
