pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod service;

use axum::Router;
use axum_macros::FromRef;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use std::sync::Arc;

use handlers::rest;
use repository::Repository;
use service::{FolderService, NoteService, TagService};

/// Everything a request handler can reach. Built once at startup and shared
/// by all requests.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub notes: Arc<NoteService>,
    pub folders: Arc<FolderService>,
    pub tags: Arc<TagService>,
}

impl AppState {
    pub fn new(repo: Arc<dyn Repository>) -> Self {
        Self {
            notes: Arc::new(NoteService::new(repo.clone())),
            folders: Arc::new(FolderService::new(repo.clone())),
            tags: Arc::new(TagService::new(repo)),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", rest::routes())
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", rest::ApiDoc::openapi()),
        )
        .fallback(rest::not_found)
        .method_not_allowed_fallback(rest::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
