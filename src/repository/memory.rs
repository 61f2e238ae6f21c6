use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use std::collections::HashMap;

use super::{Repository, StoreError};
use crate::models::{Folder, Note, NoteDraft, NoteFilter, Tag, contains_ignore_case};

/// Process-local store. Folder and tag names are unique, as in the
/// database schema.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<State>,
}

#[derive(Default)]
struct State {
    notes: HashMap<Uuid, Note>,
    folders: HashMap<Uuid, Folder>,
    tags: HashMap<Uuid, Tag>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn name_taken<'a, I>(mut names: I, name: &str, except: Option<Uuid>) -> bool
where
    I: Iterator<Item = (&'a Uuid, &'a str)>,
{
    names.any(|(id, existing)| existing == name && Some(*id) != except)
}

fn sorted_by_name<T>(
    values: impl Iterator<Item = T>,
    name: impl Fn(&T) -> &str,
    search_term: Option<&str>,
) -> Vec<T> {
    let mut matching: Vec<T> = values
        .filter(|value| search_term.is_none_or(|term| contains_ignore_case(name(value), term)))
        .collect();
    matching.sort_by(|a, b| name(a).cmp(name(b)));
    matching
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, StoreError> {
        let state = self.state.read().await;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|note| filter.matches(note))
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(a.id.cmp(&b.id)));
        Ok(notes)
    }

    async fn find_note(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        Ok(self.state.read().await.notes.get(&id).cloned())
    }

    async fn create_note(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        let now = Utc::now();
        let note = Note {
            id: Uuid::new_v4(),
            title: draft.title,
            content: draft.content,
            folder_id: draft.folder_id,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        };

        self.state.write().await.notes.insert(note.id, note.clone());
        Ok(note)
    }

    async fn update_note(&self, id: Uuid, draft: NoteDraft) -> Result<Option<Note>, StoreError> {
        let mut state = self.state.write().await;
        let Some(note) = state.notes.get_mut(&id) else {
            return Ok(None);
        };

        note.title = draft.title;
        note.content = draft.content;
        note.folder_id = draft.folder_id;
        note.tags = draft.tags;
        note.updated_at = Utc::now();

        Ok(Some(note.clone()))
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), StoreError> {
        self.state.write().await.notes.remove(&id);
        Ok(())
    }

    async fn delete_notes_in_folder(&self, folder_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let before = state.notes.len();
        state
            .notes
            .retain(|_, note| note.folder_id != Some(folder_id));
        Ok((before - state.notes.len()) as u64)
    }

    async fn pull_tag_from_notes(&self, tag_id: Uuid) -> Result<u64, StoreError> {
        let mut state = self.state.write().await;
        let mut pruned = 0;
        for note in state.notes.values_mut() {
            let before = note.tags.len();
            note.tags.retain(|id| *id != tag_id);
            if note.tags.len() != before {
                pruned += 1;
            }
        }
        Ok(pruned)
    }

    async fn list_folders(&self, search_term: Option<&str>) -> Result<Vec<Folder>, StoreError> {
        let state = self.state.read().await;
        Ok(sorted_by_name(
            state.folders.values().cloned(),
            |folder: &Folder| folder.name.as_str(),
            search_term,
        ))
    }

    async fn find_folder(&self, id: Uuid) -> Result<Option<Folder>, StoreError> {
        Ok(self.state.read().await.folders.get(&id).cloned())
    }

    async fn create_folder(&self, name: String) -> Result<Folder, StoreError> {
        let mut state = self.state.write().await;
        let names = state.folders.iter().map(|(id, f)| (id, f.name.as_str()));
        if name_taken(names, &name, None) {
            return Err(StoreError::Conflict("folders_name_key".to_string()));
        }

        let now = Utc::now();
        let folder = Folder {
            id: Uuid::new_v4(),
            name,
            created_at: now,
            updated_at: now,
        };
        state.folders.insert(folder.id, folder.clone());
        Ok(folder)
    }

    async fn update_folder(&self, id: Uuid, name: String) -> Result<Option<Folder>, StoreError> {
        let mut state = self.state.write().await;
        if !state.folders.contains_key(&id) {
            return Ok(None);
        }

        let names = state.folders.iter().map(|(id, f)| (id, f.name.as_str()));
        if name_taken(names, &name, Some(id)) {
            return Err(StoreError::Conflict("folders_name_key".to_string()));
        }

        Ok(state.folders.get_mut(&id).map(|folder| {
            folder.name = name;
            folder.updated_at = Utc::now();
            folder.clone()
        }))
    }

    async fn delete_folder(&self, id: Uuid) -> Result<(), StoreError> {
        self.state.write().await.folders.remove(&id);
        Ok(())
    }

    async fn list_tags(&self, search_term: Option<&str>) -> Result<Vec<Tag>, StoreError> {
        let state = self.state.read().await;
        Ok(sorted_by_name(
            state.tags.values().cloned(),
            |tag: &Tag| tag.name.as_str(),
            search_term,
        ))
    }

    async fn find_tag(&self, id: Uuid) -> Result<Option<Tag>, StoreError> {
        Ok(self.state.read().await.tags.get(&id).cloned())
    }

    async fn find_tags(&self, ids: &[Uuid]) -> Result<Vec<Tag>, StoreError> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.tags.get(id).cloned())
            .collect())
    }

    async fn create_tag(&self, name: String) -> Result<Tag, StoreError> {
        let mut state = self.state.write().await;
        let names = state.tags.iter().map(|(id, t)| (id, t.name.as_str()));
        if name_taken(names, &name, None) {
            return Err(StoreError::Conflict("tags_name_key".to_string()));
        }

        let now = Utc::now();
        let tag = Tag {
            id: Uuid::new_v4(),
            name,
            created_at: now,
            updated_at: now,
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    async fn update_tag(&self, id: Uuid, name: String) -> Result<Option<Tag>, StoreError> {
        let mut state = self.state.write().await;
        if !state.tags.contains_key(&id) {
            return Ok(None);
        }

        let names = state.tags.iter().map(|(id, t)| (id, t.name.as_str()));
        if name_taken(names, &name, Some(id)) {
            return Err(StoreError::Conflict("tags_name_key".to_string()));
        }

        Ok(state.tags.get_mut(&id).map(|tag| {
            tag.name = name;
            tag.updated_at = Utc::now();
            tag.clone()
        }))
    }

    async fn delete_tag(&self, id: Uuid) -> Result<(), StoreError> {
        self.state.write().await.tags.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str, folder_id: Option<Uuid>, tags: Vec<Uuid>) -> NoteDraft {
        NoteDraft {
            title: title.to_string(),
            content: None,
            folder_id,
            tags,
        }
    }

    #[tokio::test]
    async fn duplicate_folder_name_is_a_conflict() {
        let repo = MemoryRepository::new();
        repo.create_folder("Work".to_string()).await.unwrap();

        let err = repo.create_folder("Work".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.list_folders(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn renaming_a_tag_to_its_own_name_is_allowed() {
        let repo = MemoryRepository::new();
        let tag = repo.create_tag("rust".to_string()).await.unwrap();

        let updated = repo.update_tag(tag.id, "rust".to_string()).await.unwrap();
        assert_eq!(updated.map(|t| t.name), Some("rust".to_string()));
    }

    #[tokio::test]
    async fn renaming_onto_another_tag_is_a_conflict() {
        let repo = MemoryRepository::new();
        repo.create_tag("a".to_string()).await.unwrap();
        let b = repo.create_tag("b".to_string()).await.unwrap();

        let err = repo.update_tag(b.id, "a".to_string()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
        assert_eq!(repo.find_tag(b.id).await.unwrap().unwrap().name, "b");
    }

    #[tokio::test]
    async fn folders_are_listed_by_name() {
        let repo = MemoryRepository::new();
        for name in ["Personal", "Archive", "Work"] {
            repo.create_folder(name.to_string()).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_folders(None)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, ["Archive", "Personal", "Work"]);

        let filtered = repo.list_folders(Some("or")).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].name, "Work");
    }

    #[tokio::test]
    async fn uppercase_names_sort_before_lowercase() {
        let repo = MemoryRepository::new();
        for name in ["a", "b", "B"] {
            repo.create_tag(name.to_string()).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_tags(None)
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(names, ["B", "a", "b"]);
    }

    #[tokio::test]
    async fn notes_are_listed_most_recently_updated_first() {
        let repo = MemoryRepository::new();
        let first = repo.create_note(draft("first", None, vec![])).await.unwrap();
        let second = repo.create_note(draft("second", None, vec![])).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        repo.update_note(first.id, draft("first again", None, vec![]))
            .await
            .unwrap();

        let ids: Vec<Uuid> = repo
            .list_notes(&NoteFilter::default())
            .await
            .unwrap()
            .into_iter()
            .map(|n| n.id)
            .collect();
        assert_eq!(ids, [first.id, second.id]);
    }

    #[tokio::test]
    async fn folder_cascade_removes_only_that_folders_notes() {
        let repo = MemoryRepository::new();
        let doomed = repo.create_folder("doomed".to_string()).await.unwrap();
        let kept = repo.create_folder("kept".to_string()).await.unwrap();
        repo.create_note(draft("a", Some(doomed.id), vec![])).await.unwrap();
        repo.create_note(draft("b", Some(doomed.id), vec![])).await.unwrap();
        let survivor = repo.create_note(draft("c", Some(kept.id), vec![])).await.unwrap();

        repo.delete_folder_cascade(doomed.id).await.unwrap();

        assert!(repo.find_folder(doomed.id).await.unwrap().is_none());
        let remaining = repo.list_notes(&NoteFilter::default()).await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, survivor.id);
    }

    #[tokio::test]
    async fn tag_cascade_prunes_references_and_keeps_notes() {
        let repo = MemoryRepository::new();
        let doomed = repo.create_tag("doomed".to_string()).await.unwrap();
        let kept = repo.create_tag("kept".to_string()).await.unwrap();
        let note = repo
            .create_note(draft("a", None, vec![doomed.id, kept.id]))
            .await
            .unwrap();

        repo.delete_tag_cascade(doomed.id).await.unwrap();

        assert!(repo.find_tag(doomed.id).await.unwrap().is_none());
        let note = repo.find_note(note.id).await.unwrap().unwrap();
        assert_eq!(note.tags, [kept.id]);
    }

    #[tokio::test]
    async fn find_tags_keeps_order_and_skips_unknown_ids() {
        let repo = MemoryRepository::new();
        let a = repo.create_tag("a".to_string()).await.unwrap();
        let b = repo.create_tag("b".to_string()).await.unwrap();

        let found = repo
            .find_tags(&[b.id, Uuid::new_v4(), a.id])
            .await
            .unwrap();
        let names: Vec<&str> = found.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["b", "a"]);
    }
}
