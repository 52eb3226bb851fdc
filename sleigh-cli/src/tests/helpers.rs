//! Test helpers for temporary databases, captured output and HTTP requests.

use super::*;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::CONTENT_TYPE},
};
use camino::Utf8PathBuf;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

use crate::http::{self, AppState};
use sleigh_core::{DocumentStore, LocationStore, MemoryDocumentStore};

/// Temporary directory holding a database path for CLI commands.
pub(super) struct Workspace {
    _dir: TempDir,
    database: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root =
            Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self {
            database: root.join("data").join("sleigh.db"),
            _dir: dir,
        }
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.database.clone()
    }
}

/// Run a command writing to an in-memory buffer and decode its JSON output.
pub(super) fn capture_json<F>(command: F) -> Result<Value, CliError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), CliError>,
{
    let mut buffer = Vec::new();
    command(&mut buffer)?;
    Ok(serde_json::from_slice(&buffer).expect("command output should be JSON"))
}

/// Router over a fresh in-memory store.
pub(super) fn memory_app() -> Router {
    app_over(MemoryDocumentStore::new())
}

/// Router over `store`.
pub(super) fn app_over<S: DocumentStore + 'static>(store: S) -> Router {
    http::router(Arc::new(AppState::new(LocationStore::new(Arc::new(store)))))
}

/// Send one request through `app` and decode the JSON response.
pub(super) async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");
    let response = app.clone().oneshot(request).await.expect("route request");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body should be JSON")
    };
    (status, json)
}
