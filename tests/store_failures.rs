mod common;

use async_trait::async_trait;
use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

use std::sync::Arc;

use common::{app_with, create, id_of, send};
use noteful_server::{
    models::{Folder, Note, NoteDraft, NoteFilter, Tag},
    repository::{MemoryRepository, Repository, StoreError},
};

/// Delegates to an in-memory store but fails every note-side cascade step.
#[derive(Default)]
struct BrokenCleanup {
    inner: MemoryRepository,
}

fn outage() -> StoreError {
    StoreError::Unavailable("replica 10.1.2.3 unreachable".to_string())
}

#[async_trait]
impl Repository for BrokenCleanup {
    async fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, StoreError> {
        self.inner.list_notes(filter).await
    }
    async fn find_note(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        self.inner.find_note(id).await
    }
    async fn create_note(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        self.inner.create_note(draft).await
    }
    async fn update_note(&self, id: Uuid, draft: NoteDraft) -> Result<Option<Note>, StoreError> {
        self.inner.update_note(id, draft).await
    }
    async fn delete_note(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete_note(id).await
    }
    async fn delete_notes_in_folder(&self, _folder_id: Uuid) -> Result<u64, StoreError> {
        Err(outage())
    }
    async fn pull_tag_from_notes(&self, _tag_id: Uuid) -> Result<u64, StoreError> {
        Err(outage())
    }

    async fn list_folders(&self, search_term: Option<&str>) -> Result<Vec<Folder>, StoreError> {
        self.inner.list_folders(search_term).await
    }
    async fn find_folder(&self, id: Uuid) -> Result<Option<Folder>, StoreError> {
        self.inner.find_folder(id).await
    }
    async fn create_folder(&self, name: String) -> Result<Folder, StoreError> {
        self.inner.create_folder(name).await
    }
    async fn update_folder(&self, id: Uuid, name: String) -> Result<Option<Folder>, StoreError> {
        self.inner.update_folder(id, name).await
    }
    async fn delete_folder(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete_folder(id).await
    }

    async fn list_tags(&self, search_term: Option<&str>) -> Result<Vec<Tag>, StoreError> {
        self.inner.list_tags(search_term).await
    }
    async fn find_tag(&self, id: Uuid) -> Result<Option<Tag>, StoreError> {
        self.inner.find_tag(id).await
    }
    async fn find_tags(&self, ids: &[Uuid]) -> Result<Vec<Tag>, StoreError> {
        self.inner.find_tags(ids).await
    }
    async fn create_tag(&self, name: String) -> Result<Tag, StoreError> {
        self.inner.create_tag(name).await
    }
    async fn update_tag(&self, id: Uuid, name: String) -> Result<Option<Tag>, StoreError> {
        self.inner.update_tag(id, name).await
    }
    async fn delete_tag(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.delete_tag(id).await
    }
}

#[tokio::test]
async fn folder_survives_a_failed_note_cleanup() {
    let app = app_with(Arc::new(BrokenCleanup::default()));
    let folder = create(&app, "folders", json!({ "name": "keep me" })).await;
    let id = id_of(&folder);
    create(&app, "notes", json!({ "title": "inside", "folderId": id })).await;

    let reply = send(&app, "DELETE", &format!("/api/folders/{id}"), None).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, json!({ "message": "Internal Server Error" }));

    let reply = send(&app, "GET", &format!("/api/folders/{id}"), None).await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, folder);

    let reply = send(&app, "GET", &format!("/api/notes?folderId={id}"), None).await;
    assert_eq!(reply.body.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn tag_delete_reports_failure_of_either_half() {
    let app = app_with(Arc::new(BrokenCleanup::default()));
    let tag = id_of(&create(&app, "tags", json!({ "name": "t" })).await);

    let reply = send(&app, "DELETE", &format!("/api/tags/{tag}"), None).await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(reply.body, json!({ "message": "Internal Server Error" }));
}
