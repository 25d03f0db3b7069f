// PostgreSQL note storage scoped to the owning user

use crate::api::NoteStore;
use crate::core::errors::NotesError;
use crate::core::models::{NewNote, Note};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use tracing::error;

/// Database row structure for note listing
#[derive(FromRow)]
struct NoteRow {
    id: i64,
    user_id: i64,
    title: String,
    content: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            owner_id: row.user_id,
            title: row.title,
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Note store backed by the shared connection pool
///
/// Every operation is a single statement, so the pool is the only
/// synchronisation needed.
pub struct PgNoteStore {
    db_pool: PgPool,
}

impl PgNoteStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl NoteStore for PgNoteStore {
    async fn create_note(&self, note: NewNote) -> Result<Note, NotesError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO notes (user_id, title, content, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(note.owner_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(note.created_at)
        .bind(note.updated_at)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, owner_id = note.owner_id, "Failed to insert note");
            NotesError::from(e)
        })?;

        Ok(note.with_id(id))
    }

    async fn list_notes(&self, owner_id: i64) -> Result<Vec<Note>, NotesError> {
        let rows = sqlx::query_as::<_, NoteRow>(
            "SELECT id, user_id, title, content, created_at, updated_at
             FROM notes
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, owner_id, "Failed to list notes");
            NotesError::from(e)
        })?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn ping(&self) -> Result<(), NotesError> {
        sqlx::query("SELECT 1")
            .execute(&self.db_pool)
            .await
            .map(|_| ())
            .map_err(NotesError::from)
    }
}
