//! Read-only commands: `children`, `deliveries` and `route`.

use std::{io::Write, sync::Arc};

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sleigh_core::{
    Behaviour, ChildStore, DocumentStore, LocationStore, RegistryError, ResolvedChild, RouteEngine,
};

use crate::{
    ARG_BEHAVIOUR, ARG_DATABASE, CliError, DEFAULT_DATABASE, ENV_CHILDREN_BEHAVIOUR, open_store,
    write_json,
};

/// Body reported by the `route` command and `GET /route`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RouteSummary {
    pub(crate) total_distance_km: f64,
}

/// CLI arguments for the `children` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List children with the given behaviour")]
#[ortho_config(prefix = "SLEIGH")]
pub(crate) struct ChildrenArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// `good` or `bad`.
    #[arg(long = ARG_BEHAVIOUR, value_name = "behaviour")]
    #[serde(default)]
    pub(crate) behaviour: Option<String>,
}

impl ChildrenArgs {
    pub(crate) fn into_config(self) -> Result<ChildrenConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ChildrenConfig::try_from(merged)
    }
}

/// Resolved `children` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChildrenConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) behaviour: Behaviour,
}

impl TryFrom<ChildrenArgs> for ChildrenConfig {
    type Error = CliError;

    fn try_from(args: ChildrenArgs) -> Result<Self, Self::Error> {
        let raw = args.behaviour.ok_or(CliError::MissingArgument {
            field: ARG_BEHAVIOUR,
            env: ENV_CHILDREN_BEHAVIOUR,
        })?;
        let behaviour = raw.parse::<Behaviour>().map_err(RegistryError::from)?;
        Ok(Self {
            database: database_or_default(args.database),
            behaviour,
        })
    }
}

/// CLI arguments for the `deliveries` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(about = "List locations by descending good-children count")]
#[ortho_config(prefix = "SLEIGH")]
pub(crate) struct DeliveriesArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

/// CLI arguments for the `route` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Report the great-circle length, in kilometres, of the tour \
                 visiting every location by descending good-children count.",
    about = "Report the delivery route length"
)]
#[ortho_config(prefix = "SLEIGH")]
pub(crate) struct RouteArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

fn database_or_default(database: Option<Utf8PathBuf>) -> Utf8PathBuf {
    database.unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE))
}

pub(crate) fn run_children(args: ChildrenArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let children = ChildStore::new(LocationStore::new(Arc::new(store)));
    write_json(writer, &list_children(&children, config.behaviour)?)
}

pub(crate) fn run_deliveries(args: DeliveriesArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let store = open_store(&database_or_default(merged.database))?;
    let engine = RouteEngine::new(LocationStore::new(Arc::new(store)));
    write_json(writer, &engine.ranked_locations()?)
}

pub(crate) fn run_route(args: RouteArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let merged = args.load_and_merge().map_err(CliError::Configuration)?;
    let store = open_store(&database_or_default(merged.database))?;
    let engine = RouteEngine::new(LocationStore::new(Arc::new(store)));
    write_json(writer, &route_summary(&engine)?)
}

pub(crate) fn list_children<S: DocumentStore>(
    children: &ChildStore<S>,
    behaviour: Behaviour,
) -> Result<Vec<ResolvedChild>, CliError> {
    Ok(children.find_by_behaviour(behaviour)?)
}

pub(crate) fn route_summary<S: DocumentStore>(
    engine: &RouteEngine<S>,
) -> Result<RouteSummary, RegistryError> {
    Ok(RouteSummary {
        total_distance_km: engine.total_route_distance()?,
    })
}
