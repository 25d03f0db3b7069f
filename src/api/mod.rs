// Axum web server layer

use axum::{error_handling::HandleErrorLayer, routing::get, routing::post, BoxError, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod responses;

use crate::auth::audit_logger::AuditLogger;
use crate::auth::password::Password;
use crate::core::errors::{CorrectionError, CredentialError, NotesError, TokenError};
use crate::core::models::{Identity, NewNote, Note, User, UserRecord};

/// Application state containing all shared dependencies
///
/// Collaborators are held as trait objects so tests can swap in fakes.
#[derive(Clone)]
pub struct AppState {
    pub credential_store: Arc<dyn CredentialStore + Send + Sync>,
    pub token_service: Arc<dyn TokenService + Send + Sync>,
    pub correction_client: Arc<dyn CorrectionClient + Send + Sync>,
    pub note_store: Arc<dyn NoteStore + Send + Sync>,
    pub audit_logger: Arc<AuditLogger>,
    pub config: Arc<Config>,
}

/// Trait for user credential persistence and validation
#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    /// Store a new user with a salted hash of `password`
    async fn create_user(&self, username: &str, password: &Password) -> Result<User, CredentialError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, CredentialError>;

    /// Check `password` against the stored hash for `username`
    async fn validate_credential(&self, username: &str, password: &Password) -> Result<User, CredentialError>;
}

/// Trait for issuing and verifying signed identity tokens
///
/// Synchronous: signing and verification are cheap CPU work.
pub trait TokenService: Send + Sync {
    fn issue(&self, user_id: i64, username: &str) -> Result<String, TokenError>;
    fn verify(&self, token: &str) -> Result<Identity, TokenError>;
}

/// Trait for the external spelling correction call
#[async_trait::async_trait]
pub trait CorrectionClient: Send + Sync {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError>;
}

/// Trait for note persistence
#[async_trait::async_trait]
pub trait NoteStore: Send + Sync {
    async fn create_note(&self, note: NewNote) -> Result<Note, NotesError>;
    /// Notes owned by `owner_id`, newest first
    async fn list_notes(&self, owner_id: i64) -> Result<Vec<Note>, NotesError>;
    async fn ping(&self) -> Result<(), NotesError>;
}

// Re-export Config from config module
pub use crate::config::Config;

/// Create the Axum router with all routes and middleware
///
/// Middleware stack (outermost to innermost):
/// - Request timeout (tower::timeout), answered with a JSON 408
/// - Tracing (tower-http::trace)
/// - Panic recovery (tower-http::catch_panic), answered with 500
/// - Body size limit (tower-http::limit)
/// - Auth middleware, on the `/notes` routes only
///
/// `/register`, `/login` and `/health` are public.
pub fn create_router(app_state: &AppState) -> Router<AppState> {
    let protected = Router::new()
        .route(
            "/notes",
            post(handlers::create_note_handler).get(handlers::list_notes_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            crate::auth::auth_middleware::auth_middleware,
        ));

    let router = Router::new()
        .route("/register", post(handlers::register_handler))
        .route("/login", post(handlers::login_handler))
        .route("/health", get(handlers::health_handler))
        .merge(protected)
        .layer(middleware::body_size_limit_layer(app_state.config.body_size_limit_bytes))
        .layer(middleware::catch_panic_layer())
        .layer(middleware::tracing_layer());

    // HandleErrorLayer must come BEFORE timeout to catch the timeout error
    let timeout_stack = ServiceBuilder::new()
        .layer(HandleErrorLayer::new(|e: BoxError| async move {
            middleware::timeout_error_response(e)
        }))
        .layer(middleware::timeout_layer(Duration::from_secs(
            app_state.config.request_timeout_secs,
        )))
        .into_inner();

    router.layer(timeout_stack)
}
