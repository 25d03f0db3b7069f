// Common test utilities and helpers for all test modules
#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use notes_service::api::*;
use notes_service::auth::audit_logger::AuditLogger;
use notes_service::auth::credential_store::{check_credential, validate_new_credential};
use notes_service::auth::password::{CredentialHasher, Password};
use notes_service::auth::token::JwtTokenService;
use notes_service::core::errors::{CorrectionError, CredentialError, NotesError};
use notes_service::core::models::*;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Cheap Argon2 parameters so debug-build tests stay fast
pub fn test_hasher() -> Arc<CredentialHasher> {
    Arc::new(CredentialHasher::new(8, 1, 1).unwrap())
}

/// In-memory CredentialStore with the same validation path as the Postgres one
pub struct MemoryCredentialStore {
    hasher: Arc<CredentialHasher>,
    users: Mutex<HashMap<String, UserRecord>>,
    next_id: AtomicUsize,
    pub should_fail: bool,
}

impl Default for MemoryCredentialStore {
    fn default() -> Self {
        Self {
            hasher: test_hasher(),
            users: Mutex::new(HashMap::new()),
            next_id: AtomicUsize::new(1),
            should_fail: false,
        }
    }
}

impl MemoryCredentialStore {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(&self, username: &str, password: &Password) -> Result<User, CredentialError> {
        if self.should_fail {
            return Err(CredentialError::Storage("Database error".to_string()));
        }
        validate_new_credential(username, password)?;

        let password_hash = self.hasher.hash(password).await?;

        let mut users = self.users.lock().unwrap();
        if users.contains_key(username) {
            return Err(CredentialError::Conflict(username.to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
        users.insert(
            username.to_string(),
            UserRecord {
                id,
                username: username.to_string(),
                password_hash,
            },
        );

        Ok(User {
            id,
            username: username.to_string(),
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, CredentialError> {
        if self.should_fail {
            return Err(CredentialError::Storage("Database error".to_string()));
        }
        Ok(self.users.lock().unwrap().get(username).cloned())
    }

    async fn validate_credential(&self, username: &str, password: &Password) -> Result<User, CredentialError> {
        let record = self.find_by_username(username).await?;
        check_credential(&self.hasher, record, password).await
    }
}

/// In-memory NoteStore
pub struct MemoryNoteStore {
    notes: Mutex<Vec<Note>>,
    pub should_fail: bool,
}

impl Default for MemoryNoteStore {
    fn default() -> Self {
        Self {
            notes: Mutex::new(Vec::new()),
            should_fail: false,
        }
    }
}

impl MemoryNoteStore {
    pub fn failing() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn stored(&self) -> Vec<Note> {
        self.notes.lock().unwrap().clone()
    }
}

#[async_trait]
impl NoteStore for MemoryNoteStore {
    async fn create_note(&self, note: NewNote) -> Result<Note, NotesError> {
        if self.should_fail {
            return Err(NotesError::StorageError("connection refused".to_string()));
        }
        let mut notes = self.notes.lock().unwrap();
        let stored = note.with_id(notes.len() as i64 + 1);
        notes.push(stored.clone());
        Ok(stored)
    }

    async fn list_notes(&self, owner_id: i64) -> Result<Vec<Note>, NotesError> {
        if self.should_fail {
            return Err(NotesError::StorageError("connection refused".to_string()));
        }
        let mut notes: Vec<Note> = self
            .notes
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.owner_id == owner_id)
            .cloned()
            .collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(notes)
    }

    async fn ping(&self) -> Result<(), NotesError> {
        if self.should_fail {
            return Err(NotesError::StorageError("connection refused".to_string()));
        }
        Ok(())
    }
}

/// Scripted CorrectionClient: word -> replacement, first occurrence only
pub struct MockCorrectionClient {
    pub corrections: Vec<(String, String)>,
    pub failure: Option<fn() -> CorrectionError>,
}

impl Default for MockCorrectionClient {
    fn default() -> Self {
        Self {
            corrections: Vec::new(),
            failure: None,
        }
    }
}

impl MockCorrectionClient {
    pub fn with_corrections(pairs: &[(&str, &str)]) -> Self {
        Self {
            corrections: pairs
                .iter()
                .map(|(w, s)| (w.to_string(), s.to_string()))
                .collect(),
            failure: None,
        }
    }

    pub fn failing(failure: fn() -> CorrectionError) -> Self {
        Self {
            corrections: Vec::new(),
            failure: Some(failure),
        }
    }
}

#[async_trait]
impl CorrectionClient for MockCorrectionClient {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        if let Some(failure) = self.failure {
            return Err(failure());
        }
        let mut corrected = text.to_string();
        for (word, suggestion) in &self.corrections {
            corrected = corrected.replacen(word.as_str(), suggestion, 1);
        }
        Ok(corrected)
    }
}

/// CorrectionClient that panics mid-request
pub struct PanickingCorrectionClient;

#[async_trait]
impl CorrectionClient for PanickingCorrectionClient {
    async fn correct(&self, _text: &str) -> Result<String, CorrectionError> {
        panic!("speller client exploded");
    }
}

/// CorrectionClient that answers only after `delay`
pub struct SlowCorrectionClient {
    pub delay: std::time::Duration,
}

#[async_trait]
impl CorrectionClient for SlowCorrectionClient {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        tokio::time::sleep(self.delay).await;
        Ok(text.to_string())
    }
}

pub const TEST_SECRET: &[u8] = b"test-jwt-secret";

/// Build an AppState from the given collaborators
pub fn build_app_state(
    credential_store: Arc<dyn CredentialStore + Send + Sync>,
    correction_client: Arc<dyn CorrectionClient + Send + Sync>,
    note_store: Arc<dyn NoteStore + Send + Sync>,
    config: Config,
) -> AppState {
    AppState {
        credential_store,
        token_service: Arc::new(JwtTokenService::new(TEST_SECRET)),
        correction_client,
        note_store,
        audit_logger: Arc::new(AuditLogger::new()),
        config: Arc::new(config),
    }
}

/// AppState with in-memory stores and a no-op correction client
pub fn create_test_app_state() -> AppState {
    build_app_state(
        Arc::new(MemoryCredentialStore::default()),
        Arc::new(MockCorrectionClient::default()),
        Arc::new(MemoryNoteStore::default()),
        Config::test_config(),
    )
}

/// JSON POST request
pub fn json_post(uri: &str, body: serde_json::Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

/// GET request
pub fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, token);
    }
    builder.body(Body::empty()).unwrap()
}

/// Read a response body as JSON
pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
