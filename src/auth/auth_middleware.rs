// Axum authentication middleware

use crate::api::responses::ApiError;
use crate::api::AppState;
use crate::auth::audit_logger::AuthEvent;
use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{request::Parts, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;

/// Header carrying the signed token
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Identity bound to a request after successful token verification
///
/// Stored as a typed request extension, so only this module can construct it
/// and no other code can overwrite it under a colliding key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    user_id: i64,
    username: String,
}

impl AuthenticatedUser {
    pub(crate) fn new(user_id: i64, username: String) -> Self {
        Self { user_id, username }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or_else(|| ApiError::new(StatusCode::UNAUTHORIZED, "Unauthenticated".to_string()))
    }
}

/// Authentication middleware function
///
/// Reads the token from the `Authorization` header, verifies it and binds the
/// resulting identity to the request for the protected handlers.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    // 1. Extract token from header
    let Some(token) = extract_token(request.headers()) else {
        state.audit_logger.log_auth_event(
            &AuthEvent::TokenRejected { reason: "missing".to_string() },
            None,
            extract_ip_address(request.headers()).as_deref(),
            extract_user_agent(request.headers()).as_deref(),
        );
        return Err(ApiError::new(
            StatusCode::UNAUTHORIZED,
            "Missing authorization header".to_string(),
        ));
    };

    // 2. Verify signature and expiry
    let identity = match state.token_service.verify(&token) {
        Ok(identity) => identity,
        Err(e) => {
            state.audit_logger.log_auth_event(
                &AuthEvent::TokenRejected { reason: e.to_string() },
                None,
                extract_ip_address(request.headers()).as_deref(),
                extract_user_agent(request.headers()).as_deref(),
            );
            return Err(ApiError::new(StatusCode::UNAUTHORIZED, "Invalid token".to_string()));
        }
    };

    debug!(user_id = identity.user_id, "Request authenticated");

    // 3. Bind identity for handlers
    request
        .extensions_mut()
        .insert(AuthenticatedUser::new(identity.user_id, identity.username));

    Ok(next.run(request).await)
}

/// Extract the token from the authorization header
///
/// The raw token is the expected form; a `Bearer ` scheme prefix is tolerated.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())?
        .trim();

    let token = match value.strip_prefix("Bearer") {
        Some(rest) if rest.is_empty() || rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => value,
    };
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Extract IP address from request headers
///
/// Checks `X-Forwarded-For` first (for proxied requests), then `X-Real-IP`.
pub(crate) fn extract_ip_address(headers: &HeaderMap) -> Option<String> {
    headers
        .get("X-Forwarded-For")
        .or_else(|| headers.get("X-Real-IP"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

/// Extract user agent from request headers
pub(crate) fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get("User-Agent")
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}
