//! HTTP API for persistent clients
//!
//! ## Routes
//!
//! | Method | Path                      | Body           |
//! |--------|---------------------------|----------------|
//! | GET    | `/control/clients`        |                |
//! | POST   | `/control/clients/add`    | `ClientJson`   |
//! | POST   | `/control/clients/delete` | `ClientJson`   |
//! | POST   | `/control/clients/update` | `UpdateJson`   |
//! | POST   | `/control/clients/search` | `SearchJson`   |
//! | GET    | `/healthz`                |                |
//!
//! Every caller error, including malformed JSON, is answered with
//! `400 Bad Request` and a plain-text message, and leaves the registry
//! unchanged.
//!
//! Bodies are decoded by hand rather than with axum's `Json` extractor so
//! that every decoding failure maps to 400 instead of 415/422.

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::HttpConfig;
use crate::error::Error;
use crate::registry::ClientRegistry;
use crate::wire::{ClientJson, ClientListJson, SearchJson, SearchResultJson, UpdateJson};

/// Build the API router around a registry handle
pub fn router(registry: ClientRegistry, config: &HttpConfig) -> Router {
    Router::new()
        .route("/control/clients", get(handle_get_clients))
        .route("/control/clients/add", post(handle_add_client))
        .route("/control/clients/delete", post(handle_del_client))
        .route("/control/clients/update", post(handle_update_client))
        .route("/control/clients/search", post(handle_search_clients))
        .route("/healthz", get(healthz))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .with_state(registry)
}

/// Error answer of a handler
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_validation() {
            debug!(error = %self.0, "Rejecting request");
            StatusCode::BAD_REQUEST
        } else {
            warn!(error = %self.0, "Request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (status, self.0.to_string()).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

fn decode<T: DeserializeOwned>(body: &[u8]) -> ApiResult<T> {
    Ok(serde_json::from_slice(body).map_err(Error::from)?)
}

/// `GET /control/clients`
pub async fn handle_get_clients(State(registry): State<ClientRegistry>) -> Json<ClientListJson> {
    let snapshot = registry.list().await;

    Json(ClientListJson {
        clients: snapshot.iter().map(ClientJson::from_client).collect(),
        supported_tags: registry.supported_tags().to_vec(),
    })
}

/// `POST /control/clients/add`
pub async fn handle_add_client(
    State(registry): State<ClientRegistry>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let cj: ClientJson = decode(&body)?;
    let client = cj.into_client()?;

    registry.add(client).await?;
    Ok(StatusCode::OK)
}

/// `POST /control/clients/delete`
///
/// Only the `name` field of the body is used.
pub async fn handle_del_client(
    State(registry): State<ClientRegistry>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let cj: ClientJson = decode(&body)?;

    registry.remove(&cj.name).await?;
    Ok(StatusCode::OK)
}

/// `POST /control/clients/update`
pub async fn handle_update_client(
    State(registry): State<ClientRegistry>,
    body: Bytes,
) -> ApiResult<StatusCode> {
    let uj: UpdateJson = decode(&body)?;
    if uj.name.is_empty() {
        return Err(Error::invalid_name("client name to update is empty").into());
    }

    // Report a missing target before complaining about the new data
    if registry.find_by_name(&uj.name).await.is_none() {
        return Err(Error::not_found(uj.name).into());
    }

    let client = uj.data.into_client()?;
    registry.update(&uj.name, client).await?;
    Ok(StatusCode::OK)
}

/// `POST /control/clients/search`
///
/// Answers one single-key object per requested id, in request order. Ids
/// that match no client map to `null`.
pub async fn handle_search_clients(
    State(registry): State<ClientRegistry>,
    body: Bytes,
) -> ApiResult<Json<Vec<SearchResultJson>>> {
    let search: SearchJson = decode(&body)?;

    let mut results = Vec::with_capacity(search.clients.len());
    for query in search.clients {
        let found = registry
            .find(&query.id)
            .await
            .map(|c| ClientJson::from_client(&c));
        results.push(SearchResultJson::from([(query.id, found)]));
    }

    Ok(Json(results))
}

/// `GET /healthz`
pub async fn healthz(State(registry): State<ClientRegistry>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "clients": registry.len().await,
    }))
}
