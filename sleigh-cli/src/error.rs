//! Error types emitted by the Sleigh CLI.
//!
//! Keep this error type reasonably small, as many CLI helpers return
//! `Result<_, CliError>` and the workspace enables `clippy::result_large_err`.

use std::{net::SocketAddr, sync::Arc};

use camino::Utf8PathBuf;
use sleigh_core::{RegistryError, SqliteDocumentStoreError};
use thiserror::Error;

/// Errors emitted by the Sleigh CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        /// Flag name of the missing option.
        field: &'static str,
        /// Environment variable that can supply it.
        env: &'static str,
    },
    /// The bind address could not be parsed.
    #[error("invalid bind address {value:?}: {source}")]
    InvalidBindAddress {
        /// Rejected input.
        value: String,
        /// Parser error.
        #[source]
        source: std::net::AddrParseError,
    },
    /// Opening the SQLite document store failed.
    #[error("failed to open database at {path:?}: {source}")]
    OpenStore {
        /// Database path.
        path: Utf8PathBuf,
        /// Store error.
        #[source]
        source: Box<SqliteDocumentStoreError>,
    },
    /// A registry operation failed.
    #[error(transparent)]
    Registry(#[from] Box<RegistryError>),
    /// Serialising command output failed.
    #[error("failed to serialise output: {0}")]
    SerialiseOutput(#[source] serde_json::Error),
    /// Writing command output failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
    /// Building the Tokio runtime failed.
    #[error("failed to build Tokio runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Binding the HTTP listener failed.
    #[error("failed to bind {address}: {source}")]
    Bind {
        /// Requested listen address.
        address: SocketAddr,
        /// Socket error.
        #[source]
        source: std::io::Error,
    },
    /// The HTTP server stopped with an error.
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl From<RegistryError> for CliError {
    fn from(err: RegistryError) -> Self {
        Self::Registry(Box::new(err))
    }
}
