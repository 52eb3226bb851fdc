//! `serve` command: runs the HTTP surface on a Tokio runtime.

use std::{net::SocketAddr, sync::Arc};

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use sleigh_core::LocationStore;
use tokio::net::TcpListener;

use crate::{
    ARG_BIND, ARG_DATABASE, CliError, DEFAULT_BIND, DEFAULT_DATABASE,
    http::{self, AppState},
    open_store,
};

/// CLI arguments for the `serve` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Serve the location and child registries and the delivery \
                 route over HTTP until interrupted.",
    about = "Serve the registries over HTTP"
)]
#[ortho_config(prefix = "SLEIGH")]
pub(crate) struct ServeArgs {
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Socket address to listen on.
    #[arg(long = ARG_BIND, value_name = "addr")]
    #[serde(default)]
    pub(crate) bind: Option<String>,
}

impl ServeArgs {
    pub(crate) fn into_config(self) -> Result<ServeConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ServeConfig::try_from(merged)
    }
}

/// Resolved `serve` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ServeConfig {
    pub(crate) database: Utf8PathBuf,
    pub(crate) bind: SocketAddr,
}

impl TryFrom<ServeArgs> for ServeConfig {
    type Error = CliError;

    fn try_from(args: ServeArgs) -> Result<Self, Self::Error> {
        let raw = args.bind.unwrap_or_else(|| DEFAULT_BIND.to_owned());
        let bind = raw
            .parse()
            .map_err(|source| CliError::InvalidBindAddress { value: raw, source })?;
        Ok(Self {
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            bind,
        })
    }
}

pub(crate) fn run_serve(args: ServeArgs) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let state = Arc::new(AppState::new(LocationStore::new(Arc::new(store))));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(async move {
        let listener = TcpListener::bind(config.bind)
            .await
            .map_err(|source| CliError::Bind {
                address: config.bind,
                source,
            })?;
        info!(
            "serving {} on {}",
            config.database,
            listener.local_addr().unwrap_or(config.bind)
        );
        axum::serve(listener, http::router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(CliError::Serve)
    })?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    // A failed signal handler leaves the server running until killed.
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<ServeConfig, CliError> {
    let merged = ServeArgs::merge_from_layers(layers).map_err(CliError::from)?;
    ServeConfig::try_from(merged)
}
