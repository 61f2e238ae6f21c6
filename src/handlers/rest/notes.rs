use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::IntoResponse,
};
use axum_macros::debug_handler;

use std::sync::Arc;

use crate::{
    dto::{NoteQuery, NoteRequest, NoteResponse},
    error::{ApiError, ErrorBody},
    service::NoteService,
};

#[utoipa::path(
    get,
    path = "/api/notes",
    params(NoteQuery),
    responses(
        (status = 200, description = "Matching notes, most recently updated first", body = Vec<NoteResponse>),
        (status = 400, description = "Invalid filter id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler(state = crate::AppState)]
pub async fn get_all_notes(
    State(service): State<Arc<NoteService>>,
    query: Result<Query<NoteQuery>, QueryRejection>,
) -> Result<Json<Vec<NoteResponse>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(service.get_all_notes(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 200, description = "Note found", body = NoteResponse),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler(state = crate::AppState)]
pub async fn get_one_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> Result<Json<NoteResponse>, ApiError> {
    Ok(Json(service.get_one_note(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/notes",
    request_body = NoteRequest,
    responses(
        (status = 201, description = "Note created successfully", body = NoteResponse),
        (status = 400, description = "Missing title or invalid reference id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler(state = crate::AppState)]
pub async fn create_note(
    State(service): State<Arc<NoteService>>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let note = service.create_note(payload).await?;
    let location = format!("/api/notes/{}", note.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(note)))
}

#[utoipa::path(
    put,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note updated successfully", body = NoteResponse),
        (status = 400, description = "Invalid id or missing title", body = ErrorBody),
        (status = 404, description = "Note not found"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler(state = crate::AppState)]
pub async fn update_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
    payload: Result<Json<NoteRequest>, JsonRejection>,
) -> Result<Json<NoteResponse>, ApiError> {
    // A malformed id wins over a missing or malformed body.
    crate::service::parse_id(&id)?;
    let Json(payload) = payload?;
    Ok(Json(service.update_note(&id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/notes/{id}",
    params(
        ("id" = String, Path, description = "Note ID")
    ),
    responses(
        (status = 204, description = "Note deleted, or did not exist"),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "notes"
)]
#[debug_handler(state = crate::AppState)]
pub async fn delete_note(
    State(service): State<Arc<NoteService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_note(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
