//! HTTP routes over the registries and the route engine.
//!
//! Registry calls are synchronous and may block on SQLite, so every handler
//! runs them on Tokio's blocking pool.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use sleigh_core::{
    Behaviour, Child, ChildRequest, ChildStore, DocumentStore, ErrorKind, Location,
    LocationRequest, LocationStore, RegistryError, ResolvedChild, RouteEngine,
};

use crate::report::{RouteSummary, route_summary};

/// Services shared by every request.
#[derive(Debug)]
pub(crate) struct AppState<S> {
    children: ChildStore<S>,
    routes: RouteEngine<S>,
}

impl<S: DocumentStore> AppState<S> {
    pub(crate) fn new(locations: LocationStore<S>) -> Self {
        Self {
            children: ChildStore::new(locations.clone()),
            routes: RouteEngine::new(locations),
        }
    }
}

/// Build the router for all endpoints.
pub(crate) fn router<S: DocumentStore + 'static>(state: Arc<AppState<S>>) -> Router {
    Router::new()
        .route("/locations", post(create_location::<S>))
        .route("/children", post(create_child::<S>))
        .route("/children/good", get(good_children::<S>))
        .route("/children/bad", get(bad_children::<S>))
        .route("/deliveries", get(deliveries::<S>))
        .route("/route", get(route::<S>))
        .fallback(not_found)
        .with_state(state)
}

/// JSON body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) kind: String,
    pub(crate) message: String,
    /// The persisted child when its location counter could not be updated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub(crate) child: Option<Box<Child>>,
}

/// Error returned by handlers, rendered as a status code and [`ErrorBody`].
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    body: ErrorBody,
}

impl ApiError {
    fn new(status: StatusCode, kind: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorBody {
                kind: kind.to_owned(),
                message: message.into(),
                child: None,
            },
        }
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal", message)
    }
}

impl From<RegistryError> for ApiError {
    fn from(err: RegistryError) -> Self {
        let kind = err.kind();
        let status = match kind {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::StaleCounter | ErrorKind::Persistence => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!("request failed: {err}");
        }
        let mut api = Self::new(status, kind_label(kind), err.to_string());
        if let RegistryError::CounterNotUpdated { child, .. } = err {
            api.body.child = Some(child);
        }
        api
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            kind_label(ErrorKind::Validation),
            rejection.body_text(),
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

const fn kind_label(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::Validation => "validation",
        ErrorKind::Conflict => "conflict",
        ErrorKind::NotFound => "not-found",
        ErrorKind::StaleCounter => "stale-counter",
        ErrorKind::Persistence => "persistence",
    }
}

async fn blocking<T, F>(task: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, RegistryError> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(join) => {
            warn!("registry task did not complete: {join}");
            Err(ApiError::internal("registry task did not complete"))
        }
    }
}

/// Location id as sent by clients: a JSON number or a string.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum LocationIdInput {
    Number(u64),
    Text(String),
}

/// Request body of `POST /children`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ChildBody {
    name: String,
    behaviour: Option<String>,
    location_id: Option<LocationIdInput>,
}

impl From<ChildBody> for ChildRequest {
    fn from(body: ChildBody) -> Self {
        Self {
            name: body.name,
            behaviour: body.behaviour,
            location_id: body.location_id.map(|id| match id {
                LocationIdInput::Number(raw) => raw.to_string(),
                LocationIdInput::Text(raw) => raw,
            }),
        }
    }
}

async fn create_location<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<LocationRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Location>), ApiError> {
    let Json(request) = body?;
    let locations = state.children.locations().clone();
    let location = blocking(move || locations.create(&request)).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

async fn create_child<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<ChildBody>, JsonRejection>,
) -> Result<(StatusCode, Json<Child>), ApiError> {
    let request = ChildRequest::from(body?.0);
    let children = state.children.clone();
    let child = blocking(move || children.create(&request)).await?;
    Ok((StatusCode::CREATED, Json(child)))
}

async fn children_with<S: DocumentStore + 'static>(
    state: &AppState<S>,
    behaviour: Behaviour,
) -> Result<Json<Vec<ResolvedChild>>, ApiError> {
    let children = state.children.clone();
    Ok(Json(
        blocking(move || children.find_by_behaviour(behaviour)).await?,
    ))
}

async fn good_children<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ResolvedChild>>, ApiError> {
    children_with(&state, Behaviour::Good).await
}

async fn bad_children<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<ResolvedChild>>, ApiError> {
    children_with(&state, Behaviour::Bad).await
}

async fn deliveries<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<Vec<Location>>, ApiError> {
    let routes = state.routes.clone();
    Ok(Json(blocking(move || routes.ranked_locations()).await?))
}

async fn route<S: DocumentStore + 'static>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Json<RouteSummary>, ApiError> {
    let routes = state.routes.clone();
    Ok(Json(blocking(move || route_summary(&routes)).await?))
}

#[expect(clippy::unused_async, reason = "axum fallbacks are async handlers")]
async fn not_found() -> ApiError {
    ApiError::new(
        StatusCode::NOT_FOUND,
        kind_label(ErrorKind::NotFound),
        "no such endpoint",
    )
}
