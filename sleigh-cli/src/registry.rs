//! `location` and `child` registration commands.

use std::{io::Write, sync::Arc};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sleigh_core::{
    Child, ChildRequest, ChildStore, Coordinates, DocumentStore, Location, LocationRequest,
    LocationStore,
};

use crate::{
    ARG_BEHAVIOUR, ARG_DATABASE, ARG_LAT, ARG_LOCATION_ID, ARG_LON, ARG_NAME, CliError,
    DEFAULT_DATABASE, ENV_CHILD_NAME, ENV_LOCATION_NAME, open_store, write_json,
};

/// CLI arguments for the `location` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Register a delivery location with a unique name and its \
                 coordinates. The new location starts with no good children.",
    about = "Register a delivery location"
)]
#[ortho_config(prefix = "SLEIGH")]
pub(crate) struct LocationArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Unique location name.
    #[arg(long = ARG_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// Latitude in degrees, within [-90, 90].
    #[arg(long = ARG_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude in degrees, within [-180, 180].
    #[arg(long = ARG_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
}

impl LocationArgs {
    pub(crate) fn into_config(self) -> Result<LocationConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        LocationConfig::try_from(merged)
    }
}

/// Resolved `location` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LocationConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) request: LocationRequest,
}

impl TryFrom<LocationArgs> for LocationConfig {
    type Error = CliError;

    fn try_from(args: LocationArgs) -> Result<Self, Self::Error> {
        let name = args.name.ok_or(CliError::MissingArgument {
            field: ARG_NAME,
            env: ENV_LOCATION_NAME,
        })?;
        // Half a coordinate pair is reported as missing coordinates.
        let coordinates = args
            .lat
            .zip(args.lon)
            .map(|(lat, lon)| Coordinates::new(lat, lon));
        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            request: LocationRequest { name, coordinates },
        })
    }
}

/// CLI arguments for the `child` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Register a child at an existing location. Registering a \
                 good child increments the location's good-children count.",
    about = "Register a child"
)]
#[ortho_config(prefix = "SLEIGH")]
pub(crate) struct ChildArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Unique child name.
    #[arg(long = ARG_NAME, value_name = "name")]
    #[serde(default)]
    pub(crate) name: Option<String>,
    /// `good` or `bad`.
    #[arg(long = ARG_BEHAVIOUR, value_name = "behaviour")]
    #[serde(default)]
    pub(crate) behaviour: Option<String>,
    /// Identifier of the child's location.
    #[arg(long = ARG_LOCATION_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) location_id: Option<String>,
}

impl ChildArgs {
    pub(crate) fn into_config(self) -> Result<ChildConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ChildConfig::try_from(merged)
    }
}

/// Resolved `child` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChildConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) request: ChildRequest,
}

impl TryFrom<ChildArgs> for ChildConfig {
    type Error = CliError;

    fn try_from(args: ChildArgs) -> Result<Self, Self::Error> {
        let name = args.name.ok_or(CliError::MissingArgument {
            field: ARG_NAME,
            env: ENV_CHILD_NAME,
        })?;
        // Behaviour and location id are validated by the registry so the
        // CLI reports the same errors as the HTTP surface.
        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            request: ChildRequest {
                name,
                behaviour: args.behaviour,
                location_id: args.location_id,
            },
        })
    }
}

pub(crate) fn run_location(args: LocationArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let location = register_location(&LocationStore::new(Arc::new(store)), &config)?;
    write_json(writer, &location)
}

pub(crate) fn run_child(args: ChildArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let children = ChildStore::new(LocationStore::new(Arc::new(store)));
    let child = register_child(&children, &config)?;
    write_json(writer, &child)
}

pub(crate) fn register_location<S: DocumentStore>(
    locations: &LocationStore<S>,
    config: &LocationConfig,
) -> Result<Location, CliError> {
    Ok(locations.create(&config.request)?)
}

pub(crate) fn register_child<S: DocumentStore>(
    children: &ChildStore<S>,
    config: &ChildConfig,
) -> Result<Child, CliError> {
    Ok(children.create(&config.request)?)
}
