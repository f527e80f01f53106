//! REST client for the render service HTTP endpoints.
//!
//! Wraps job submission and status lookup using [`reqwest`]. Every
//! request carries the bearer credential; the client itself never
//! retries, backs off, or caches. Retry policy lives with the caller.

use async_trait::async_trait;

use crate::payload::RenderRequest;
use crate::service::RenderService;
use crate::snapshot::{JobSnapshot, RawStatus, SubmitReceipt};

/// HTTP client for one render service deployment.
pub struct RenderApi {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

/// Errors from the render service REST layer.
#[derive(Debug, thiserror::Error)]
pub enum RenderApiError {
    /// The HTTP request itself failed (network, DNS, TLS, decode).
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("render service error ({status}): {message}")]
    Remote {
        /// HTTP status code.
        status: u16,
        /// Message extracted from the response body.
        message: String,
    },

    /// The service no longer knows the job id.
    #[error("render job {job_id} not found")]
    JobNotFound { job_id: String },
}

impl RenderApiError {
    /// Whether an operation that failed with this error may be retried.
    ///
    /// Transport problems and server-side 5xx are transient. Anything
    /// the service rejected outright (4xx, unknown job) is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            RenderApiError::Transport(_) => true,
            RenderApiError::Remote { status, .. } => *status >= 500,
            RenderApiError::JobNotFound { .. } => false,
        }
    }
}

impl RenderApi {
    /// Create a client for a render service deployment.
    ///
    /// * `api_url` - Base URL including the API version prefix, e.g.
    ///   `https://render.example.com/api/v2`. A trailing slash is
    ///   tolerated.
    /// * `api_key` - Bearer credential. Used for request signing only;
    ///   never written to logs.
    pub fn new(api_url: String, api_key: String) -> Self {
        Self::with_client(reqwest::Client::new(), api_url, api_key)
    }

    /// Create a client reusing an existing [`reqwest::Client`]
    /// (connection pooling across API handles).
    pub fn with_client(client: reqwest::Client, api_url: String, api_key: String) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Submit a render job.
    ///
    /// Sends `POST /jobs` with the request payload as JSON and returns
    /// the server-assigned job handle.
    pub async fn submit_job(
        &self,
        request: &RenderRequest,
    ) -> Result<SubmitReceipt, RenderApiError> {
        let response = self
            .client
            .post(format!("{}/jobs", self.api_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        Self::parse_response(response).await
    }

    /// Fetch the raw status of a submitted job.
    ///
    /// Sends `GET /jobs/{id}`. A 404 means the service has forgotten the
    /// job (expired or purged) and maps to [`RenderApiError::JobNotFound`].
    pub async fn job_status(&self, job_id: &str) -> Result<RawStatus, RenderApiError> {
        let response = self
            .client
            .get(format!("{}/jobs/{job_id}", self.api_url))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RenderApiError::JobNotFound {
                job_id: job_id.to_string(),
            });
        }

        Self::parse_response(response).await
    }

    // ---- private helpers ----

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or a [`RenderApiError::Remote`]
    /// with the extracted body message on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, RenderApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RenderApiError::Remote {
                status: status.as_u16(),
                message: extract_error_message(status.as_u16(), &body),
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, RenderApiError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl RenderService for RenderApi {
    async fn submit(&self, request: &RenderRequest) -> Result<SubmitReceipt, RenderApiError> {
        self.submit_job(request).await
    }

    async fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot, RenderApiError> {
        Ok(JobSnapshot::from(self.job_status(job_id).await?))
    }
}

/// Pull a human-readable message out of an error response body.
///
/// The service reports failures as JSON with an `error` or `message`
/// string (empty strings are skipped). Plain-text bodies are used as-is;
/// anything unreadable falls back to the status code.
fn extract_error_message(status: u16, body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => {
            for key in ["error", "message"] {
                if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                    if !text.trim().is_empty() {
                        return text.to_string();
                    }
                }
            }
        }
        Err(_) => {
            let trimmed = body.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }
    format!("request failed with status {status}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_field_preferred() {
        let msg = extract_error_message(400, r#"{"error":"bad template","message":"other"}"#);
        assert_eq!(msg, "bad template");
    }

    #[test]
    fn message_field_as_fallback() {
        let msg = extract_error_message(400, r#"{"message":"template missing"}"#);
        assert_eq!(msg, "template missing");
    }

    #[test]
    fn empty_error_field_skipped() {
        let msg = extract_error_message(400, r#"{"error":"","message":"real reason"}"#);
        assert_eq!(msg, "real reason");
    }

    #[test]
    fn plain_text_body_used_verbatim() {
        let msg = extract_error_message(502, "Bad Gateway\n");
        assert_eq!(msg, "Bad Gateway");
    }

    #[test]
    fn unhelpful_json_falls_back_to_status() {
        let msg = extract_error_message(500, r#"{"detail":42}"#);
        assert_eq!(msg, "request failed with status 500");
    }

    #[test]
    fn empty_body_falls_back_to_status() {
        let msg = extract_error_message(503, "");
        assert_eq!(msg, "request failed with status 503");
    }

    #[test]
    fn retryable_classification() {
        let server = RenderApiError::Remote {
            status: 503,
            message: "unavailable".to_string(),
        };
        let client = RenderApiError::Remote {
            status: 422,
            message: "bad payload".to_string(),
        };
        let missing = RenderApiError::JobNotFound {
            job_id: "j1".to_string(),
        };
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!missing.is_retryable());
    }
}
