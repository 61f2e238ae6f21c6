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
    dto::{FolderResponse, NameQuery, NameRequest},
    error::{ApiError, ErrorBody},
    service::FolderService,
};

#[utoipa::path(
    get,
    path = "/api/folders",
    params(NameQuery),
    responses(
        (status = 200, description = "Matching folders sorted by name", body = Vec<FolderResponse>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "folders"
)]
#[debug_handler(state = crate::AppState)]
pub async fn get_all_folders(
    State(service): State<Arc<FolderService>>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<Vec<FolderResponse>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(service.get_all_folders(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/folders/{id}",
    params(
        ("id" = String, Path, description = "Folder ID")
    ),
    responses(
        (status = 200, description = "Folder found", body = FolderResponse),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "Folder not found"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "folders"
)]
#[debug_handler(state = crate::AppState)]
pub async fn get_one_folder(
    State(service): State<Arc<FolderService>>,
    Path(id): Path<String>,
) -> Result<Json<FolderResponse>, ApiError> {
    Ok(Json(service.get_one_folder(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/folders",
    request_body = NameRequest,
    responses(
        (status = 201, description = "Folder created successfully", body = FolderResponse),
        (status = 400, description = "Missing or duplicate name", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "folders"
)]
#[debug_handler(state = crate::AppState)]
pub async fn create_folder(
    State(service): State<Arc<FolderService>>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let folder = service.create_folder(payload).await?;
    let location = format!("/api/folders/{}", folder.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(folder)))
}

#[utoipa::path(
    put,
    path = "/api/folders/{id}",
    params(
        ("id" = String, Path, description = "Folder ID")
    ),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Folder updated successfully", body = FolderResponse),
        (status = 400, description = "Invalid id, missing or duplicate name", body = ErrorBody),
        (status = 404, description = "Folder not found"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "folders"
)]
#[debug_handler(state = crate::AppState)]
pub async fn update_folder(
    State(service): State<Arc<FolderService>>,
    Path(id): Path<String>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> Result<Json<FolderResponse>, ApiError> {
    // A malformed id wins over a missing or malformed body.
    crate::service::parse_id(&id)?;
    let Json(payload) = payload?;
    Ok(Json(service.update_folder(&id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/folders/{id}",
    params(
        ("id" = String, Path, description = "Folder ID")
    ),
    responses(
        (status = 204, description = "Folder and its notes deleted, or folder did not exist"),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "folders"
)]
#[debug_handler(state = crate::AppState)]
pub async fn delete_folder(
    State(service): State<Arc<FolderService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_folder(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
