use uuid::Uuid;

use std::{collections::HashMap, sync::Arc};

use super::{parse_id, parse_optional_id, required, search_term};
use crate::{
    dto::{NoteQuery, NoteRequest, NoteResponse, TagResponse},
    error::ApiError,
    models::{Note, NoteDraft, NoteFilter, Tag},
    repository::Repository,
};

#[derive(Clone)]
pub struct NoteService {
    repo: Arc<dyn Repository>,
}

impl NoteService {
    pub const fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_all_notes(&self, query: NoteQuery) -> Result<Vec<NoteResponse>, ApiError> {
        let filter = NoteFilter {
            search_term: search_term(query.search_term),
            folder_id: parse_optional_id(query.folder_id.as_deref())?,
            tag_id: parse_optional_id(query.tag_id.as_deref())?,
        };

        let notes = self.repo.list_notes(&filter).await?;
        self.with_tags(notes).await
    }

    pub async fn get_one_note(&self, id: &str) -> Result<NoteResponse, ApiError> {
        let id = parse_id(id)?;
        let note = self.repo.find_note(id).await?.ok_or(ApiError::NotFound)?;
        self.with_tags_one(note).await
    }

    pub async fn create_note(&self, request: NoteRequest) -> Result<NoteResponse, ApiError> {
        let draft = draft(request)?;
        let note = self.repo.create_note(draft).await?;

        tracing::info!("Created note {}", note.id);
        self.with_tags_one(note).await
    }

    pub async fn update_note(
        &self,
        id: &str,
        request: NoteRequest,
    ) -> Result<NoteResponse, ApiError> {
        let id = parse_id(id)?;
        let draft = draft(request)?;
        let note = self
            .repo
            .update_note(id, draft)
            .await?
            .ok_or(ApiError::NotFound)?;

        self.with_tags_one(note).await
    }

    pub async fn delete_note(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        self.repo.delete_note(id).await?;

        tracing::info!("Deleted note {}", id);
        Ok(())
    }

    async fn with_tags_one(&self, note: Note) -> Result<NoteResponse, ApiError> {
        let tags = self.repo.find_tags(&note.tags).await?;
        let tags = tags.into_iter().map(TagResponse::from).collect();
        Ok(NoteResponse::new(note, tags))
    }

    /// Expands the tag references of many notes with a single lookup.
    async fn with_tags(&self, notes: Vec<Note>) -> Result<Vec<NoteResponse>, ApiError> {
        let mut ids: Vec<Uuid> = notes.iter().flat_map(|n| n.tags.iter().copied()).collect();
        ids.sort_unstable();
        ids.dedup();

        let known: HashMap<Uuid, Tag> = self
            .repo
            .find_tags(&ids)
            .await?
            .into_iter()
            .map(|tag| (tag.id, tag))
            .collect();

        Ok(notes
            .into_iter()
            .map(|note| {
                let tags = note
                    .tags
                    .iter()
                    .filter_map(|id| known.get(id).cloned().map(TagResponse::from))
                    .collect();
                NoteResponse::new(note, tags)
            })
            .collect())
    }
}

fn draft(request: NoteRequest) -> Result<NoteDraft, ApiError> {
    let title = required(request.title, "title")?;
    let folder_id = parse_optional_id(request.folder_id.as_deref())?;
    let tags = request
        .tags
        .unwrap_or_default()
        .iter()
        .map(|tag| parse_id(tag))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NoteDraft {
        title,
        content: request.content,
        folder_id,
        tags,
    })
}
