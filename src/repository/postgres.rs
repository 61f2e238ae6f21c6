use async_trait::async_trait;
use tokio::sync::{Mutex, MutexGuard};
use tokio_postgres::{Client, NoTls, Row, error::SqlState, types::ToSql};
use uuid::Uuid;

use super::{Repository, StoreError, embedded::migrations};
use crate::models::{Folder, Note, NoteDraft, NoteFilter, Tag};

const NOTE_COLUMNS: &str = "id, title, content, folder_id, tags, created_at, updated_at";
const NAMED_COLUMNS: &str = "id, name, created_at, updated_at";

const FOLDERS: &str = "folders";
const TAGS: &str = "tags";

pub struct PgRepository {
    client: Mutex<Client>,
}

impl PgRepository {
    pub async fn new(database_dsn: &str) -> Result<Self, StoreError> {
        let (client, con) = tokio_postgres::connect(database_dsn, NoTls).await?;

        tokio::spawn(async move {
            if let Err(e) = con.await {
                tracing::error!("connection error: {}", e);
            }
        });

        Ok(Self {
            client: Mutex::new(client),
        })
    }

    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut client = self.client().await?;
        let migrations_report = migrations::runner().run_async(&mut *client).await?;

        for migration in migrations_report.applied_migrations() {
            tracing::info!(
                "Migration Applied -  Name: {}, Version: {}",
                migration.name(),
                migration.version()
            );
        }

        tracing::info!("DB migrations finished!");

        Ok(())
    }

    async fn client(&self) -> Result<MutexGuard<'_, Client>, StoreError> {
        let client = self.client.lock().await;
        if client.is_closed() {
            return Err(StoreError::Unavailable(
                "database connection closed".to_string(),
            ));
        }
        Ok(client)
    }

    async fn list_named(
        &self,
        table: &str,
        search_term: Option<&str>,
    ) -> Result<Vec<NamedRow>, StoreError> {
        let client = self.client().await?;
        let rows = match search_term {
            Some(term) => {
                client
                    .query(
                        format!(
                            "SELECT {NAMED_COLUMNS} FROM {table} \
                             WHERE strpos(lower(name), lower($1::text)) > 0 \
                             ORDER BY name COLLATE \"C\""
                        )
                        .as_str(),
                        &[&term],
                    )
                    .await?
            }
            None => {
                client
                    .query(
                        format!(
                            "SELECT {NAMED_COLUMNS} FROM {table} ORDER BY name COLLATE \"C\""
                        )
                        .as_str(),
                        &[],
                    )
                    .await?
            }
        };

        rows.iter().map(NamedRow::try_from).collect::<Result<_, _>>().map_err(Into::into)
    }

    async fn find_named(&self, table: &str, id: Uuid) -> Result<Option<NamedRow>, StoreError> {
        let row = self
            .client()
            .await?
            .query_opt(
                format!("SELECT {NAMED_COLUMNS} FROM {table} WHERE id = $1").as_str(),
                &[&id],
            )
            .await?;

        row.as_ref().map(NamedRow::try_from).transpose().map_err(Into::into)
    }

    async fn create_named(&self, table: &str, name: &str) -> Result<NamedRow, StoreError> {
        let row = self
            .client()
            .await?
            .query_one(
                format!(
                    "INSERT INTO {table} (id, name) VALUES ($1, $2) RETURNING {NAMED_COLUMNS}"
                )
                .as_str(),
                &[&Uuid::new_v4(), &name],
            )
            .await
            .map_err(classify)?;

        Ok(NamedRow::try_from(&row)?)
    }

    async fn update_named(
        &self,
        table: &str,
        id: Uuid,
        name: &str,
    ) -> Result<Option<NamedRow>, StoreError> {
        let row = self
            .client()
            .await?
            .query_opt(
                format!(
                    "UPDATE {table} SET name = $2, updated_at = now() \
                     WHERE id = $1 RETURNING {NAMED_COLUMNS}"
                )
                .as_str(),
                &[&id, &name],
            )
            .await
            .map_err(classify)?;

        row.as_ref().map(NamedRow::try_from).transpose().map_err(Into::into)
    }

    async fn delete_named(&self, table: &str, id: Uuid) -> Result<(), StoreError> {
        self.client()
            .await?
            .execute(format!("DELETE FROM {table} WHERE id = $1").as_str(), &[&id])
            .await?;

        Ok(())
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn list_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, StoreError> {
        let mut clauses: Vec<String> = Vec::new();
        let mut params: Vec<&(dyn ToSql + Sync)> = Vec::new();

        if let Some(term) = &filter.search_term {
            params.push(term);
            clauses.push(format!(
                "strpos(lower(title), lower(${}::text)) > 0",
                params.len()
            ));
        }
        if let Some(folder_id) = &filter.folder_id {
            params.push(folder_id);
            clauses.push(format!("folder_id = ${}", params.len()));
        }
        if let Some(tag_id) = &filter.tag_id {
            params.push(tag_id);
            clauses.push(format!("${} = ANY(tags)", params.len()));
        }

        let mut sql = format!("SELECT {NOTE_COLUMNS} FROM notes");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY updated_at DESC, id");

        let rows = self.client().await?.query(sql.as_str(), &params).await?;

        rows.iter().map(note_from_row).collect::<Result<_, _>>().map_err(Into::into)
    }

    async fn find_note(&self, id: Uuid) -> Result<Option<Note>, StoreError> {
        let row = self
            .client()
            .await?
            .query_opt(
                format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1").as_str(),
                &[&id],
            )
            .await?;

        row.as_ref().map(note_from_row).transpose().map_err(Into::into)
    }

    async fn create_note(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        let row = self
            .client()
            .await?
            .query_one(
                format!(
                    "INSERT INTO notes (id, title, content, folder_id, tags) \
                     VALUES ($1, $2, $3, $4, $5) RETURNING {NOTE_COLUMNS}"
                )
                .as_str(),
                &[
                    &Uuid::new_v4(),
                    &draft.title,
                    &draft.content,
                    &draft.folder_id,
                    &draft.tags,
                ],
            )
            .await
            .map_err(classify)?;

        Ok(note_from_row(&row)?)
    }

    async fn update_note(&self, id: Uuid, draft: NoteDraft) -> Result<Option<Note>, StoreError> {
        let row = self
            .client()
            .await?
            .query_opt(
                format!(
                    "UPDATE notes SET title = $2, content = $3, folder_id = $4, tags = $5, \
                     updated_at = now() WHERE id = $1 RETURNING {NOTE_COLUMNS}"
                )
                .as_str(),
                &[
                    &id,
                    &draft.title,
                    &draft.content,
                    &draft.folder_id,
                    &draft.tags,
                ],
            )
            .await
            .map_err(classify)?;

        row.as_ref().map(note_from_row).transpose().map_err(Into::into)
    }

    async fn delete_note(&self, id: Uuid) -> Result<(), StoreError> {
        self.client()
            .await?
            .execute("DELETE FROM notes WHERE id = $1", &[&id])
            .await?;

        Ok(())
    }

    async fn delete_notes_in_folder(&self, folder_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .client()
            .await?
            .execute("DELETE FROM notes WHERE folder_id = $1", &[&folder_id])
            .await?)
    }

    async fn pull_tag_from_notes(&self, tag_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .client()
            .await?
            .execute(
                "UPDATE notes SET tags = array_remove(tags, $1) WHERE $1 = ANY(tags)",
                &[&tag_id],
            )
            .await?)
    }

    async fn list_folders(&self, search_term: Option<&str>) -> Result<Vec<Folder>, StoreError> {
        let rows = self.list_named(FOLDERS, search_term).await?;
        Ok(rows.into_iter().map(Folder::from).collect())
    }

    async fn find_folder(&self, id: Uuid) -> Result<Option<Folder>, StoreError> {
        Ok(self.find_named(FOLDERS, id).await?.map(Folder::from))
    }

    async fn create_folder(&self, name: String) -> Result<Folder, StoreError> {
        Ok(self.create_named(FOLDERS, &name).await?.into())
    }

    async fn update_folder(&self, id: Uuid, name: String) -> Result<Option<Folder>, StoreError> {
        Ok(self.update_named(FOLDERS, id, &name).await?.map(Folder::from))
    }

    async fn delete_folder(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_named(FOLDERS, id).await
    }

    async fn list_tags(&self, search_term: Option<&str>) -> Result<Vec<Tag>, StoreError> {
        let rows = self.list_named(TAGS, search_term).await?;
        Ok(rows.into_iter().map(Tag::from).collect())
    }

    async fn find_tag(&self, id: Uuid) -> Result<Option<Tag>, StoreError> {
        Ok(self.find_named(TAGS, id).await?.map(Tag::from))
    }

    async fn find_tags(&self, ids: &[Uuid]) -> Result<Vec<Tag>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .client()
            .await?
            .query(
                format!("SELECT {NAMED_COLUMNS} FROM tags WHERE id = ANY($1)").as_str(),
                &[&ids],
            )
            .await?;

        let mut found = rows
            .iter()
            .map(NamedRow::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // Keep the caller's ordering.
        let mut ordered = Vec::with_capacity(found.len());
        for id in ids {
            if let Some(pos) = found.iter().position(|row| row.id == *id) {
                ordered.push(Tag::from(found.swap_remove(pos)));
            }
        }

        Ok(ordered)
    }

    async fn create_tag(&self, name: String) -> Result<Tag, StoreError> {
        Ok(self.create_named(TAGS, &name).await?.into())
    }

    async fn update_tag(&self, id: Uuid, name: String) -> Result<Option<Tag>, StoreError> {
        Ok(self.update_named(TAGS, id, &name).await?.map(Tag::from))
    }

    async fn delete_tag(&self, id: Uuid) -> Result<(), StoreError> {
        self.delete_named(TAGS, id).await
    }

    async fn delete_folder_cascade(&self, id: Uuid) -> Result<(), StoreError> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;

        let removed = tx
            .execute("DELETE FROM notes WHERE folder_id = $1", &[&id])
            .await?;
        tx.execute("DELETE FROM folders WHERE id = $1", &[&id])
            .await?;
        tx.commit().await?;

        tracing::debug!("Removed {} notes of folder {}", removed, id);
        Ok(())
    }

    async fn delete_tag_cascade(&self, id: Uuid) -> Result<(), StoreError> {
        let mut client = self.client().await?;
        let tx = client.transaction().await?;

        tx.execute("DELETE FROM tags WHERE id = $1", &[&id]).await?;
        let pruned = tx
            .execute(
                "UPDATE notes SET tags = array_remove(tags, $1) WHERE $1 = ANY(tags)",
                &[&id],
            )
            .await?;
        tx.commit().await?;

        tracing::debug!("Pruned tag {} from {} notes", id, pruned);
        Ok(())
    }
}

fn classify(err: tokio_postgres::Error) -> StoreError {
    if err.code() == Some(&SqlState::UNIQUE_VIOLATION) {
        let constraint = err
            .as_db_error()
            .and_then(|db| db.constraint())
            .unwrap_or("unique")
            .to_string();
        return StoreError::Conflict(constraint);
    }

    StoreError::Backend(err)
}

fn note_from_row(row: &Row) -> Result<Note, tokio_postgres::Error> {
    Ok(Note {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        content: row.try_get("content")?,
        folder_id: row.try_get("folder_id")?,
        tags: row.try_get("tags")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Row shape shared by the `folders` and `tags` tables.
struct NamedRow {
    id: Uuid,
    name: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<&Row> for NamedRow {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl From<NamedRow> for Folder {
    fn from(row: NamedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<NamedRow> for Tag {
    fn from(row: NamedRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
