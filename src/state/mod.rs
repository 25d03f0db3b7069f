// Persistent state: note storage and schema migrations

pub mod note_store;

use crate::core::errors::NotesError;
use sqlx::PgPool;

/// Apply the embedded schema migrations
pub async fn run_migrations(db_pool: &PgPool) -> Result<(), NotesError> {
    sqlx::migrate!("./migrations")
        .run(db_pool)
        .await
        .map_err(|e| NotesError::StorageError(format!("Migration failed: {}", e)))
}
