use crate::{AppState, Error};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{Map, Value};

use crate::journal::DocumentId;

use log::*;

/// GET all documents.
///
/// Mounted behind the change stream middleware, so an
/// `Accept: text/event-stream` request never reaches this handler.
pub async fn index(State(app_state): State<AppState>) -> impl IntoResponse {
    debug!("GET all documents");

    Json(app_state.journal.all())
}

/// POST create a new document
pub async fn create(
    State(app_state): State<AppState>,
    Json(fields): Json<Map<String, Value>>,
) -> impl IntoResponse {
    debug!("POST Create a new document from: {fields:?}");

    let document = app_state.journal.insert(fields);

    (StatusCode::CREATED, Json(document))
}

/// PUT replace the fields of a document
pub async fn update(
    State(app_state): State<AppState>,
    Path(id): Path<DocumentId>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<impl IntoResponse, Error> {
    debug!("PUT Update document with id: {id}");

    let document = app_state
        .journal
        .update(&id, fields)
        .ok_or(Error::DocumentNotFound(id))?;

    Ok(Json(document))
}
