use std::sync::Arc;

use super::{conflict_as, parse_id, required, search_term};
use crate::{
    dto::{FolderResponse, NameQuery, NameRequest},
    error::ApiError,
    repository::Repository,
};

const NAME_TAKEN: &str = "The folder name already exists";

#[derive(Clone)]
pub struct FolderService {
    repo: Arc<dyn Repository>,
}

impl FolderService {
    pub const fn new(repo: Arc<dyn Repository>) -> Self {
        Self { repo }
    }

    pub async fn get_all_folders(
        &self,
        query: NameQuery,
    ) -> Result<Vec<FolderResponse>, ApiError> {
        let term = search_term(query.search_term);
        let folders = self.repo.list_folders(term.as_deref()).await?;
        Ok(folders.into_iter().map(FolderResponse::from).collect())
    }

    pub async fn get_one_folder(&self, id: &str) -> Result<FolderResponse, ApiError> {
        let id = parse_id(id)?;
        self.repo
            .find_folder(id)
            .await?
            .map(FolderResponse::from)
            .ok_or(ApiError::NotFound)
    }

    pub async fn create_folder(&self, request: NameRequest) -> Result<FolderResponse, ApiError> {
        let name = required(request.name, "name")?;
        let folder = self
            .repo
            .create_folder(name)
            .await
            .map_err(conflict_as(NAME_TAKEN))?;

        tracing::info!("Created folder {} ({})", folder.id, folder.name);
        Ok(folder.into())
    }

    pub async fn update_folder(
        &self,
        id: &str,
        request: NameRequest,
    ) -> Result<FolderResponse, ApiError> {
        let id = parse_id(id)?;
        let name = required(request.name, "name")?;

        self.repo
            .update_folder(id, name)
            .await
            .map_err(conflict_as(NAME_TAKEN))?
            .map(FolderResponse::from)
            .ok_or(ApiError::NotFound)
    }

    /// Deletes the folder together with every note filed under it.
    pub async fn delete_folder(&self, id: &str) -> Result<(), ApiError> {
        let id = parse_id(id)?;
        self.repo.delete_folder_cascade(id).await?;

        tracing::info!("Deleted folder {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::NoteFilter, repository::MemoryRepository};
    use uuid::Uuid;

    fn service() -> (FolderService, Arc<MemoryRepository>) {
        let repo = Arc::new(MemoryRepository::new());
        (FolderService::new(repo.clone()), repo)
    }

    fn named(name: &str) -> NameRequest {
        NameRequest {
            name: Some(name.to_string()),
        }
    }

    #[tokio::test]
    async fn missing_name_is_rejected() {
        let (service, repo) = service();

        let err = service
            .create_folder(NameRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Missing `name` in request body");
        assert!(repo.list_folders(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn duplicate_name_is_a_client_error() {
        let (service, _) = service();
        let original = service.create_folder(named("Work")).await.unwrap();

        let err = service.create_folder(named("Work")).await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == NAME_TAKEN));

        let kept = service
            .get_one_folder(&original.id.to_string())
            .await
            .unwrap();
        assert_eq!(kept.name, "Work");
        assert_eq!(kept.updated_at, original.updated_at);
    }

    #[tokio::test]
    async fn rename_onto_existing_name_is_a_client_error() {
        let (service, _) = service();
        service.create_folder(named("Work")).await.unwrap();
        let home = service.create_folder(named("Home")).await.unwrap();

        let err = service
            .update_folder(&home.id.to_string(), named("Work"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(ref m) if m == NAME_TAKEN));
    }

    #[tokio::test]
    async fn update_of_unknown_folder_is_not_found() {
        let (service, _) = service();

        let err = service
            .update_folder(&Uuid::new_v4().to_string(), named("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_the_folders_notes() {
        let (service, repo) = service();
        let folder = service.create_folder(named("doomed")).await.unwrap();
        repo.create_note(crate::models::NoteDraft {
            title: "inside".to_string(),
            content: None,
            folder_id: Some(folder.id),
            tags: vec![],
        })
        .await
        .unwrap();

        service
            .delete_folder(&folder.id.to_string())
            .await
            .unwrap();

        assert!(repo.list_notes(&NoteFilter::default()).await.unwrap().is_empty());
        let err = service
            .get_one_folder(&folder.id.to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn delete_requires_a_valid_id() {
        let (service, _) = service();

        let err = service.delete_folder("bogus").await.unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }
}
