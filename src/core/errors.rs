// Domain error types - component errors are translated into the request taxonomy here

use thiserror::Error;

/// Request-level error taxonomy
///
/// Every component error converts into one of these variants; the HTTP layer
/// only ever sees `NotesError`.
#[derive(Error, Debug)]
pub enum NotesError {
    /// Malformed body or failed validation (HTTP 400)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing/invalid/expired token or bad credentials (HTTP 401)
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Unknown username at login (HTTP 404, only when explicitly enabled)
    #[error("Not found: {0}")]
    NotFound(String),

    /// Duplicate username (HTTP 409)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Correction service could not be reached (HTTP 500)
    #[error("Correction service unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Correction service answered with an undecodable payload (HTTP 500)
    #[error("Correction service returned a bad response: {0}")]
    BadResponse(String),

    /// Persistence failure (HTTP 500)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Hashing or signing failure (HTTP 500)
    #[error("Internal error: {0}")]
    Internal(String),

    /// Configuration error (HTTP 500)
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Credential Store errors
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Invalid credential input: {0}")]
    InvalidInput(String),

    #[error("Username '{0}' already exists")]
    Conflict(String),

    #[error("User not found")]
    NotFound,

    #[error("Password does not match")]
    InvalidCredential,

    #[error("Failed to hash password: {0}")]
    Hashing(String),

    #[error("Database error: {0}")]
    Storage(String),
}

/// Token Service errors
#[derive(Error, Debug)]
pub enum TokenError {
    /// Bad signature, malformed token or expired `exp`
    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Failed to sign token: {0}")]
    Signing(String),
}

/// Correction Client errors
#[derive(Error, Debug)]
pub enum CorrectionError {
    #[error("Correction service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Failed to decode correction response: {0}")]
    BadResponse(String),
}

impl NotesError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            NotesError::InvalidInput(_) => 400,
            NotesError::Unauthenticated(_) => 401,
            NotesError::NotFound(_) => 404,
            NotesError::Conflict(_) => 409,
            NotesError::UpstreamUnavailable(_) => 500,
            NotesError::BadResponse(_) => 500,
            NotesError::StorageError(_) => 500,
            NotesError::Internal(_) => 500,
            NotesError::ConfigurationError(_) => 500,
        }
    }

    /// Get user-facing error message (no internal detail)
    pub fn user_message(&self) -> String {
        match self {
            NotesError::InvalidInput(reason) => format!("Invalid input: {}", reason),
            NotesError::Unauthenticated(reason) => reason.clone(),
            NotesError::NotFound(reason) => reason.clone(),
            NotesError::Conflict(_) => "Username already taken".to_string(),
            NotesError::UpstreamUnavailable(_) => "Failed to check spelling".to_string(),
            NotesError::BadResponse(_) => "Failed to check spelling".to_string(),
            NotesError::StorageError(_) => "Internal error".to_string(),
            NotesError::Internal(_) => "Internal error".to_string(),
            NotesError::ConfigurationError(_) => "Internal error".to_string(),
        }
    }
}

impl From<CredentialError> for NotesError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::InvalidInput(reason) => NotesError::InvalidInput(reason),
            CredentialError::Conflict(username) => NotesError::Conflict(username),
            CredentialError::NotFound => NotesError::NotFound("User not found".to_string()),
            CredentialError::InvalidCredential => {
                NotesError::Unauthenticated("Invalid credentials".to_string())
            }
            CredentialError::Hashing(e) => NotesError::Internal(e),
            CredentialError::Storage(e) => NotesError::StorageError(e),
        }
    }
}

impl From<TokenError> for NotesError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(_) => NotesError::Unauthenticated("Invalid token".to_string()),
            TokenError::Signing(e) => NotesError::Internal(e),
        }
    }
}

impl From<CorrectionError> for NotesError {
    fn from(err: CorrectionError) -> Self {
        match err {
            CorrectionError::ServiceUnavailable(e) => NotesError::UpstreamUnavailable(e),
            CorrectionError::BadResponse(e) => NotesError::BadResponse(e),
        }
    }
}

impl From<sqlx::Error> for NotesError {
    fn from(err: sqlx::Error) -> Self {
        NotesError::StorageError(err.to_string())
    }
}
