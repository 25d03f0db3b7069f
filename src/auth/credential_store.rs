// Database-backed credential storage

use crate::api::CredentialStore;
use crate::auth::password::{CredentialHasher, Password};
use crate::core::errors::CredentialError;
use crate::core::models::{User, UserRecord};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;
use tracing::{debug, error};

/// Database row structure for user lookup
#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

/// Reject empty usernames and passwords before any hashing happens
pub fn validate_new_credential(username: &str, password: &Password) -> Result<(), CredentialError> {
    if username.trim().is_empty() {
        return Err(CredentialError::InvalidInput("username must not be empty".to_string()));
    }
    if password.is_empty() {
        return Err(CredentialError::InvalidInput("password must not be empty".to_string()));
    }
    Ok(())
}

/// Compare a password against a looked-up record
///
/// Shared by every `CredentialStore` implementation so that the unknown-user
/// path spends the same hashing effort as the wrong-password path.
pub async fn check_credential(
    hasher: &Arc<CredentialHasher>,
    record: Option<UserRecord>,
    password: &Password,
) -> Result<User, CredentialError> {
    let Some(record) = record else {
        hasher.verify_unknown_user(password).await;
        return Err(CredentialError::NotFound);
    };

    if hasher.verify(&record.password_hash, password).await? {
        Ok(record.into())
    } else {
        Err(CredentialError::InvalidCredential)
    }
}

/// PostgreSQL credential store
///
/// Username uniqueness is enforced by the `users.username` unique constraint,
/// so concurrent registrations of the same name resolve to one success and
/// one `Conflict`.
pub struct PgCredentialStore {
    db_pool: PgPool,
    hasher: Arc<CredentialHasher>,
}

impl PgCredentialStore {
    pub fn new(db_pool: PgPool, hasher: Arc<CredentialHasher>) -> Self {
        Self { db_pool, hasher }
    }

    fn map_insert_error(err: sqlx::Error, username: &str) -> CredentialError {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                CredentialError::Conflict(username.to_string())
            }
            _ => {
                error!(error = %err, "Failed to insert user");
                CredentialError::Storage(err.to_string())
            }
        }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, username: &str, password: &Password) -> Result<User, CredentialError> {
        validate_new_credential(username, password)?;

        let password_hash = self.hasher.hash(password).await?;

        let (id, username): (i64, String) = sqlx::query_as(
            "INSERT INTO users (username, password_hash)
             VALUES ($1, $2)
             RETURNING id, username",
        )
        .bind(username)
        .bind(&password_hash)
        .fetch_one(&self.db_pool)
        .await
        .map_err(|e| Self::map_insert_error(e, username))?;

        debug!(user_id = id, "User row inserted");

        Ok(User { id, username })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, CredentialError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash
             FROM users
             WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| CredentialError::Storage(e.to_string()))?;

        Ok(row.map(UserRecord::from))
    }

    async fn validate_credential(&self, username: &str, password: &Password) -> Result<User, CredentialError> {
        let record = self.find_by_username(username).await?;
        check_credential(&self.hasher, record, password).await
    }
}
