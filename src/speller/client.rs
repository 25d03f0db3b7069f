// HTTP client for the external speller service

use crate::api::CorrectionClient;
use crate::core::errors::{CorrectionError, NotesError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

/// One misspelled word reported by the speller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellResult {
    pub word: String,
    /// Suggestions, best first
    #[serde(rename = "s", default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub code: i32,
}

/// Apply speller results to `text`
///
/// Results are applied in the order returned. Each one replaces only the first
/// occurrence of its word with the top suggestion, so a word repeated in the
/// text is corrected once. Results without suggestions, or with an empty
/// word, leave the text unchanged.
pub fn apply_corrections(text: &str, results: &[SpellResult]) -> String {
    let mut corrected = text.to_string();
    for result in results {
        if result.word.is_empty() {
            continue;
        }
        if let Some(suggestion) = result.suggestions.first() {
            corrected = corrected.replacen(&result.word, suggestion, 1);
        }
    }
    corrected
}

/// Speller client (Yandex.Speller `checkText` compatible)
///
/// Sends a single GET per call with the text in the `text` query parameter.
/// No retry: a failed call fails the caller.
pub struct SpellerClient {
    http_client: Client,
    endpoint: Url,
    timeout: Duration,
}

impl SpellerClient {
    /// Create a new SpellerClient
    ///
    /// # Arguments
    /// * `endpoint` - Absolute URL of the check endpoint
    /// * `timeout_secs` - Whole-call timeout in seconds
    pub fn new(endpoint: &str, timeout_secs: u64) -> Result<Self, NotesError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            NotesError::ConfigurationError(format!("Invalid speller URL '{}': {}", endpoint, e))
        })?;
        let timeout = Duration::from_secs(timeout_secs);

        let http_client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(2))
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                NotesError::ConfigurationError(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            endpoint,
            timeout,
        })
    }

    /// Fetch raw speller results for `text`
    pub async fn check_text(&self, text: &str) -> Result<Vec<SpellResult>, CorrectionError> {
        let response = self
            .http_client
            .get(self.endpoint.clone())
            .query(&[("text", text)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    CorrectionError::ServiceUnavailable(format!(
                        "Request timeout after {}s",
                        self.timeout.as_secs()
                    ))
                } else if e.is_connect() {
                    CorrectionError::ServiceUnavailable("Connection failed".to_string())
                } else {
                    CorrectionError::ServiceUnavailable(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, url = %self.endpoint, "Speller returned HTTP error");
            return Err(CorrectionError::ServiceUnavailable(format!(
                "Speller error: HTTP {}",
                status
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CorrectionError::ServiceUnavailable(format!("Failed to read response: {}", e)))?;

        serde_json::from_slice::<Vec<SpellResult>>(&body).map_err(|e| {
            error!(error = %e, url = %self.endpoint, "Failed to parse speller response");
            CorrectionError::BadResponse(e.to_string())
        })
    }
}

#[async_trait]
impl CorrectionClient for SpellerClient {
    async fn correct(&self, text: &str) -> Result<String, CorrectionError> {
        let results = self.check_text(text).await?;
        debug!(misspelled = results.len(), "Speller check completed");
        Ok(apply_corrections(text, &results))
    }
}
