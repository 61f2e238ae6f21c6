use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::models::{Folder, Note, Tag};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// Note ID
    pub id: Uuid,
    /// Note title
    pub title: String,
    /// Note content
    pub content: Option<String>,
    /// Folder the note belongs to
    pub folder_id: Option<Uuid>,
    /// Tags referenced by the note
    pub tags: Vec<TagResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NoteResponse {
    /// Builds the response from a note and its already resolved tags.
    pub fn new(note: Note, tags: Vec<TagResponse>) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            folder_id: note.folder_id,
            tags,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

/// Body of note create and update requests.
///
/// Every field is optional on the wire so that missing values are reported
/// with a field-specific message instead of a generic decoding error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NoteRequest {
    /// Note title, required
    pub title: Option<String>,
    /// Note content
    pub content: Option<String>,
    /// Folder ID, an empty string means no folder
    pub folder_id: Option<String>,
    /// Tag IDs
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    /// Folder ID
    pub id: Uuid,
    /// Folder name
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Folder> for FolderResponse {
    fn from(folder: Folder) -> Self {
        Self {
            id: folder.id,
            name: folder.name,
            created_at: folder.created_at,
            updated_at: folder.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TagResponse {
    /// Tag ID
    pub id: Uuid,
    /// Tag name
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            created_at: tag.created_at,
            updated_at: tag.updated_at,
        }
    }
}

/// Body of folder and tag create and update requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct NameRequest {
    /// Name, required and unique
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NoteQuery {
    /// Case-insensitive substring of the title
    pub search_term: Option<String>,
    /// Only notes in this folder
    pub folder_id: Option<String>,
    /// Only notes carrying this tag
    pub tag_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct NameQuery {
    /// Case-insensitive substring of the name
    pub search_term: Option<String>,
}
