mod embedded;
mod memory;
mod postgres;

pub use memory::MemoryRepository;
pub use postgres::PgRepository;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Folder, Note, NoteDraft, NoteFilter, Tag};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field already holds the submitted value.
    #[error("Unique constraint violated: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Database error: {0}")]
    Backend(#[from] tokio_postgres::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] refinery::Error),
}

/// Document store capability shared by every resource family.
///
/// Deletes never report whether a record existed. Lists are returned already
/// sorted: notes by most recent update, folders and tags by name.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, StoreError>;
    async fn find_note(&self, id: Uuid) -> Result<Option<Note>, StoreError>;
    async fn create_note(&self, draft: NoteDraft) -> Result<Note, StoreError>;
    async fn update_note(&self, id: Uuid, draft: NoteDraft) -> Result<Option<Note>, StoreError>;
    async fn delete_note(&self, id: Uuid) -> Result<(), StoreError>;
    async fn delete_notes_in_folder(&self, folder_id: Uuid) -> Result<u64, StoreError>;
    async fn pull_tag_from_notes(&self, tag_id: Uuid) -> Result<u64, StoreError>;

    async fn list_folders(&self, search_term: Option<&str>) -> Result<Vec<Folder>, StoreError>;
    async fn find_folder(&self, id: Uuid) -> Result<Option<Folder>, StoreError>;
    async fn create_folder(&self, name: String) -> Result<Folder, StoreError>;
    async fn update_folder(&self, id: Uuid, name: String) -> Result<Option<Folder>, StoreError>;
    async fn delete_folder(&self, id: Uuid) -> Result<(), StoreError>;

    async fn list_tags(&self, search_term: Option<&str>) -> Result<Vec<Tag>, StoreError>;
    async fn find_tag(&self, id: Uuid) -> Result<Option<Tag>, StoreError>;
    /// Tags with the given ids, in the order given. Unknown ids are skipped.
    async fn find_tags(&self, ids: &[Uuid]) -> Result<Vec<Tag>, StoreError>;
    async fn create_tag(&self, name: String) -> Result<Tag, StoreError>;
    async fn update_tag(&self, id: Uuid, name: String) -> Result<Option<Tag>, StoreError>;
    async fn delete_tag(&self, id: Uuid) -> Result<(), StoreError>;

    /// Removes the folder's notes, then the folder. The folder is left in
    /// place if the note cleanup fails.
    async fn delete_folder_cascade(&self, id: Uuid) -> Result<(), StoreError> {
        let removed = self.delete_notes_in_folder(id).await?;
        tracing::debug!("Removed {} notes of folder {}", removed, id);
        self.delete_folder(id).await
    }

    /// Removes the tag and strips it from every note; both run concurrently
    /// and must both finish.
    async fn delete_tag_cascade(&self, id: Uuid) -> Result<(), StoreError> {
        let ((), pruned) = tokio::try_join!(self.delete_tag(id), self.pull_tag_from_notes(id))?;
        tracing::debug!("Pruned tag {} from {} notes", id, pruned);
        Ok(())
    }
}
