use std::sync::Arc;

use super::{conflict_as, parse_id, required, search_term};
use crate::{
    dto::{NameQuery, NameRequest, TagResponse},
    error::ApiError,
    repository::Repository,
};

const NAME_TAKEN: &str = "The tag name already exists";

#[derive(Clone)]
pub struct TagService {
    repo: Arc<dyn Repository>,
}

impl TagService {
    pub const fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_all_tags(&self, query: NameQuery) -> Result<Vec<TagResponse>, ApiError> {
        let term = search_term(query.search_term);
        let tags = self.repo.list_tags(term.as_deref()).await?;
        Ok(tags.into_iter().map(TagResponse::from).collect())
    }

    pub async fn get_one_tag(&self, id: &str) -> Result<TagResponse, ApiError> {
        let id = parse_id(id)?;
        self.repo
            .find_tag(id)
            .await?
            .map(TagResponse::from)
            .ok_or(ApiError::NotFound)
    }

    pub async fn create_tag(&self, request: NameRequest) -> Result<TagResponse, ApiError> {
        let name = required(request.name, "name")?;
        let tag = self
            .repo
            .create_tag(name)
            .await
            .map_err(conflict_as(NAME_TAKEN))?;

        tracing::info!("Created tag {} ({})", tag.id, tag.name);
        Ok(tag.into())
    }

    pub async fn update_tag(
        &self,
        id: &str,
        request: NameRequest,
    ) -> Result<TagResponse, ApiError> {
        let id = parse_id(id)?;
        let name = required(request.name, "name")?;

        self.repo
            .update_tag(id, name)
            .await
            .map_err(conflict_as(NAME_TAKEN))?
            .map(TagResponse::from)
            .ok_or(ApiError::NotFound)
    }

    /// Deletes the tag and strips it from every note; the notes stay.
    pub async fn delete_tag(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        self.repo.delete_tag_cascade(id).await?;

        tracing::info!("Deleted tag {}", id);
        Ok(())
    }
}
