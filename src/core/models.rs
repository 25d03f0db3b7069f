// Core data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Registered user as exposed to callers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
}

/// User row including the stored Argon2 PHC string
///
/// Never serialized; only the Credential Store and login path see it.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub password_hash: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
        }
    }
}

/// Stored note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i64,
    #[serde(rename = "user_id")]
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Note about to be persisted; `id` is assigned by the store
#[derive(Debug, Clone)]
pub struct NewNote {
    pub owner_id: i64,
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewNote {
    /// Build a note owned by `owner_id` with both timestamps set to the same instant
    pub fn new(owner_id: i64, title: String, content: String, now: DateTime<Utc>) -> Self {
        Self {
            owner_id,
            title,
            content,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(self, id: i64) -> Note {
        Note {
            id,
            owner_id: self.owner_id,
            title: self.title,
            content: self.content,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Identity carried by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

/// Body of `POST /register` and `POST /login`
#[derive(Debug, Clone, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Body of `POST /notes`
#[derive(Debug, Clone, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    pub content: String,
}
