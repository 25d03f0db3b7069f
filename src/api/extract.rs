// JSON body extractor with taxonomy-shaped rejections

use async_trait::async_trait;
use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
    http::StatusCode,
};
use serde::de::DeserializeOwned;

use crate::api::responses::ApiError;
use crate::core::errors::NotesError;

/// JSON body decoded with `serde_json`
///
/// Unlike `axum::Json` it does not insist on a `Content-Type` header, and
/// every decode failure becomes a 400 `InvalidInput`. Failures reading the
/// body (such as the size limit) keep their own status.
#[derive(Debug)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            let status = rejection.status();
            let message = if status == StatusCode::PAYLOAD_TOO_LARGE {
                "Request body too large".to_string()
            } else {
                rejection.body_text()
            };
            ApiError::new(status, message)
        })?;

        serde_json::from_slice(&bytes)
            .map(ValidJson)
            .map_err(|e| ApiError::from(NotesError::InvalidInput(e.to_string())))
    }
}
