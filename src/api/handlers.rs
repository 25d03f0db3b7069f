// Request handlers for API endpoints

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::Json,
};
use chrono::Utc;
use tracing::{error, info, warn};

use crate::api::extract::ValidJson;
use crate::api::responses::{ApiError, HealthResponse, LoginResponse, RegisterResponse};
use crate::api::AppState;
use crate::auth::audit_logger::AuthEvent;
use crate::auth::auth_middleware::{extract_ip_address, extract_user_agent, AuthenticatedUser};
use crate::auth::password::Password;
use crate::core::errors::{CredentialError, NotesError};
use crate::core::models::{CreateNoteRequest, CredentialsRequest, NewNote, Note};

/// Extract or generate request ID
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

/// Registration handler
///
/// POST /register
///
/// Returns 201 with `{id, username}`; the password is never echoed.
pub async fn register_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let request_id = request_id(&headers);
    let password = Password::new(&request.password);

    let user = app_state
        .credential_store
        .create_user(&request.username, &password)
        .await
        .map_err(|e| {
            match &e {
                CredentialError::Conflict(_) | CredentialError::InvalidInput(_) => {
                    warn!(error = %e, request_id = %request_id, "Registration rejected");
                }
                _ => error!(error = %e, request_id = %request_id, "Registration failed"),
            }
            ApiError::from_notes_error_with_id(e.into(), request_id.clone())
        })?;

    app_state.audit_logger.log_auth_event(
        &AuthEvent::Registered { user_id: user.id },
        Some(&user.username),
        extract_ip_address(&headers).as_deref(),
        extract_user_agent(&headers).as_deref(),
    );

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            id: user.id,
            username: user.username,
        }),
    ))
}

/// Login handler
///
/// POST /login
///
/// Unknown user and wrong password both answer 401 unless the deployment
/// opts into revealing unknown users as 404. The audit log always records
/// which one it was.
pub async fn login_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    ValidJson(request): ValidJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let request_id = request_id(&headers);
    let password = Password::new(&request.password);
    let ip_address = extract_ip_address(&headers);
    let user_agent = extract_user_agent(&headers);

    let user = match app_state
        .credential_store
        .validate_credential(&request.username, &password)
        .await
    {
        Ok(user) => user,
        Err(e) => {
            let reason = match &e {
                CredentialError::NotFound => Some("unknown_user"),
                CredentialError::InvalidCredential => Some("wrong_password"),
                _ => None,
            };

            let Some(reason) = reason else {
                error!(error = %e, request_id = %request_id, "Credential validation failed");
                return Err(ApiError::from_notes_error_with_id(e.into(), request_id));
            };

            app_state.audit_logger.log_auth_event(
                &AuthEvent::LoginFailure { reason: reason.to_string() },
                Some(&request.username),
                ip_address.as_deref(),
                user_agent.as_deref(),
            );

            let err = if matches!(e, CredentialError::NotFound)
                && app_state.config.login_reveals_unknown_user
            {
                NotesError::NotFound("User not found".to_string())
            } else {
                NotesError::Unauthenticated("Invalid credentials".to_string())
            };
            return Err(ApiError::from_notes_error_with_id(err, request_id));
        }
    };

    let token = app_state
        .token_service
        .issue(user.id, &user.username)
        .map_err(|e| {
            error!(error = %e, request_id = %request_id, "Failed to issue token");
            ApiError::from_notes_error_with_id(e.into(), request_id.clone())
        })?;

    app_state.audit_logger.log_auth_event(
        &AuthEvent::LoginSuccess { user_id: user.id },
        Some(&user.username),
        ip_address.as_deref(),
        user_agent.as_deref(),
    );

    Ok(Json(LoginResponse { token }))
}

/// Note creation handler
///
/// POST /notes
///
/// Request flow:
/// 1. Correct the content through the speller
/// 2. Stamp owner and timestamps
/// 3. Persist and return the stored note
///
/// A failed correction fails the whole request; nothing is stored.
pub async fn create_note_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    user: AuthenticatedUser,
    ValidJson(request): ValidJson<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let request_id = request_id(&headers);

    let corrected = app_state
        .correction_client
        .correct(&request.content)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = user.user_id(),
                request_id = %request_id,
                "Spelling correction failed"
            );
            ApiError::from_notes_error_with_id(e.into(), request_id.clone())
        })?;

    let new_note = NewNote::new(user.user_id(), request.title, corrected, Utc::now());

    let note = app_state
        .note_store
        .create_note(new_note)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = user.user_id(),
                request_id = %request_id,
                "Failed to store note"
            );
            ApiError::from_notes_error_with_id(e, request_id.clone())
        })?;

    info!(
        note_id = note.id,
        user_id = user.user_id(),
        request_id = %request_id,
        "Note created"
    );

    Ok((StatusCode::CREATED, Json(note)))
}

/// Note listing handler
///
/// GET /notes
///
/// Returns only the caller's notes, newest first.
pub async fn list_notes_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    user: AuthenticatedUser,
) -> Result<Json<Vec<Note>>, ApiError> {
    let request_id = request_id(&headers);

    let notes = app_state
        .note_store
        .list_notes(user.user_id())
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = user.user_id(),
                request_id = %request_id,
                "Failed to list notes"
            );
            ApiError::from_notes_error_with_id(e, request_id.clone())
        })?;

    Ok(Json(notes))
}

/// Health check handler
///
/// GET /health
pub async fn health_handler(
    State(app_state): State<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    match tokio::time::timeout(
        std::time::Duration::from_millis(800),
        app_state.note_store.ping(),
    )
    .await
    {
        Ok(Ok(())) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy".to_string(),
                database: "connected".to_string(),
            }),
        ),
        Ok(Err(e)) => {
            warn!(error = %e, "Database ping failed");
            unhealthy()
        }
        Err(_) => {
            warn!("Database ping timed out in health check");
            unhealthy()
        }
    }
}

fn unhealthy() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(HealthResponse {
            status: "unhealthy".to_string(),
            database: "disconnected".to_string(),
        }),
    )
}
