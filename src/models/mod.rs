use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Note {
    pub id: Uuid,
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated note fields. Create and update both write every field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tags: Vec<Uuid>,
}

/// Criteria for listing notes. Absent criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFilter {
    pub search_term: Option<String>,
    pub folder_id: Option<Uuid>,
    pub tag_id: Option<Uuid>,
}

impl NoteFilter {
    pub fn matches(&self, note: &Note) -> bool {
        if let Some(term) = &self.search_term
            && !contains_ignore_case(&note.title, term)
        {
            return false;
        }

        if let Some(folder_id) = self.folder_id
            && note.folder_id != Some(folder_id)
        {
            return false;
        }

        if let Some(tag_id) = self.tag_id
            && !note.tags.contains(&tag_id)
        {
            return false;
        }

        true
    }
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
