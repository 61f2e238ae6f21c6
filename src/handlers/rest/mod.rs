pub mod folders;
pub mod notes;
pub mod tags;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use utoipa::OpenApi;

use crate::{
    AppState,
    dto::{FolderResponse, NameRequest, NoteRequest, NoteResponse, TagResponse},
    error::ErrorBody,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        notes::get_all_notes,
        notes::get_one_note,
        notes::create_note,
        notes::update_note,
        notes::delete_note,
        folders::get_all_folders,
        folders::get_one_folder,
        folders::create_folder,
        folders::update_folder,
        folders::delete_folder,
        tags::get_all_tags,
        tags::get_one_tag,
        tags::create_tag,
        tags::update_tag,
        tags::delete_tag
    ),
    components(schemas(
        NoteResponse,
        NoteRequest,
        FolderResponse,
        TagResponse,
        NameRequest,
        ErrorBody
    )),
    tags(
        (name = "notes", description = "Notes management API"),
        (name = "folders", description = "Folders; deleting one deletes its notes"),
        (name = "tags", description = "Tags; deleting one removes it from notes")
    )
)]
pub struct ApiDoc;

/// Routes of the three resource families, relative to `/api`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notes", get(notes::get_all_notes).post(notes::create_note))
        .route(
            "/notes/{id}",
            get(notes::get_one_note)
                .put(notes::update_note)
                .delete(notes::delete_note),
        )
        .route(
            "/folders",
            get(folders::get_all_folders).post(folders::create_folder),
        )
        .route(
            "/folders/{id}",
            get(folders::get_one_folder)
                .put(folders::update_folder)
                .delete(folders::delete_folder),
        )
        .route("/tags", get(tags::get_all_tags).post(tags::create_tag))
        .route(
            "/tags/{id}",
            get(tags::get_one_tag)
                .put(tags::update_tag)
                .delete(tags::delete_tag),
        )
}

pub async fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("Not Found"))).into_response()
}
