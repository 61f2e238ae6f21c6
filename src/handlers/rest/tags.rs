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
    dto::{NameQuery, NameRequest, TagResponse},
    error::{ApiError, ErrorBody},
    service::TagService,
};

#[utoipa::path(
    get,
    path = "/api/tags",
    params(NameQuery),
    responses(
        (status = 200, description = "Matching tags sorted by name", body = Vec<TagResponse>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "tags"
)]
#[debug_handler(state = crate::AppState)]
pub async fn get_all_tags(
    State(service): State<Arc<TagService>>,
    query: Result<Query<NameQuery>, QueryRejection>,
) -> Result<Json<Vec<TagResponse>>, ApiError> {
    let Query(query) = query?;
    Ok(Json(service.get_all_tags(query).await?))
}

#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(
        ("id" = String, Path, description = "Tag ID")
    ),
    responses(
        (status = 200, description = "Tag found", body = TagResponse),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 404, description = "Tag not found"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "tags"
)]
#[debug_handler(state = crate::AppState)]
pub async fn get_one_tag(
    State(service): State<Arc<TagService>>,
    Path(id): Path<String>,
) -> Result<Json<TagResponse>, ApiError> {
    Ok(Json(service.get_one_tag(&id).await?))
}

#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = NameRequest,
    responses(
        (status = 201, description = "Tag created successfully", body = TagResponse),
        (status = 400, description = "Missing or duplicate name", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "tags"
)]
#[debug_handler(state = crate::AppState)]
pub async fn create_tag(
    State(service): State<Arc<TagService>>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(payload) = payload?;
    let tag = service.create_tag(payload).await?;
    let location = format!("/api/tags/{}", tag.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(tag)))
}

#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    params(
        ("id" = String, Path, description = "Tag ID")
    ),
    request_body = NameRequest,
    responses(
        (status = 200, description = "Tag updated successfully", body = TagResponse),
        (status = 400, description = "Invalid id, missing or duplicate name", body = ErrorBody),
        (status = 404, description = "Tag not found"),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "tags"
)]
#[debug_handler(state = crate::AppState)]
pub async fn update_tag(
    State(service): State<Arc<TagService>>,
    Path(id): Path<String>,
    payload: Result<Json<NameRequest>, JsonRejection>,
) -> Result<Json<TagResponse>, ApiError> {
    // A malformed id wins over a missing or malformed body.
    crate::service::parse_id(&id)?;
    let Json(payload) = payload?;
    Ok(Json(service.update_tag(&id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(
        ("id" = String, Path, description = "Tag ID")
    ),
    responses(
        (status = 204, description = "Tag deleted and removed from notes, or tag did not exist"),
        (status = 400, description = "Invalid id", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "tags"
)]
#[debug_handler(state = crate::AppState)]
pub async fn delete_tag(
    State(service): State<Arc<TagService>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service.delete_tag(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
