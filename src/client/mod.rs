use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use crate::models::ReportSnapshot;
use crate::pacing::Pacer;

/// Delay before the single automatic retry of a gateway failure.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// Response code the submission endpoint uses for an extension it does not
/// know about.
pub const UNKNOWN_EXTENSION_CODE: i64 = 802;

/// Failure kinds of the remote report service. Only `BadGateway` is
/// transient; everything else is fatal to the calling operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("401 - API Not Authorized - Please check your API token")]
    Unauthorized,
    #[error("403 - API Error - Please check your API parameters")]
    Forbidden,
    #[error("404 - API Not Found - Please check your API endpoint")]
    NotFound,
    #[error("500 - The API reported an internal server error")]
    ServerError,
    #[error("502 - The API gateway is temporarily unavailable")]
    BadGateway,
    #[error("An unknown API error has occurred")]
    Unknown,
}

/// The single call contract all network I/O flows through.
#[async_trait]
pub trait ReportApi: Send + Sync {
    async fn get(&self, path: &str) -> std::result::Result<Value, ApiError>;
    async fn post(&self, path: &str, body: Value) -> std::result::Result<Value, ApiError>;
}

/// HTTP client for the CRXcavator API.
pub struct CrxcavatorClient {
    http: reqwest::Client,
    base_uri: String,
    api_key: Option<String>,
    pacer: Arc<dyn Pacer>,
}

impl CrxcavatorClient {
    pub fn new(base_uri: &str, api_key: Option<String>, pacer: Arc<dyn Pacer>) -> Self {
        Self {
            http: reqwest::Client::builder()
                .user_agent(concat!("crxscan/", env!("CARGO_PKG_VERSION")))
                .build()
                .expect("Failed to create HTTP client"),
            base_uri: base_uri.trim_end_matches('/').to_string(),
            api_key,
            pacer,
        }
    }

    async fn send_once(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> std::result::Result<Value, ApiError> {
        let url = format!("{}{}", self.base_uri, path);

        let mut request = self.http.request(method, &url);
        if let Some(ref key) = self.api_key {
            request = request.header("API-Key", key);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|_| ApiError::Unknown)?;

        match response.status().as_u16() {
            200..=299 => response.json().await.map_err(|_| ApiError::Unknown),
            401 => Err(ApiError::Unauthorized),
            403 => Err(ApiError::Forbidden),
            404 => Err(ApiError::NotFound),
            500 => Err(ApiError::ServerError),
            502 => Err(ApiError::BadGateway),
            _ => Err(ApiError::Unknown),
        }
    }

    async fn call(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> std::result::Result<Value, ApiError> {
        with_gateway_retry(self.pacer.as_ref(), || {
            self.send_once(method.clone(), path, body)
        })
        .await
    }
}

/// Transport retry policy: a gateway failure earns exactly one retry after a
/// fixed delay, and a second consecutive gateway failure escalates to
/// `Unknown`. Every other outcome passes through untouched.
pub async fn with_gateway_retry<F, Fut>(
    pacer: &dyn Pacer,
    operation: F,
) -> std::result::Result<Value, ApiError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = std::result::Result<Value, ApiError>>,
{
    match operation().await {
        Err(ApiError::BadGateway) => {
            log::debug!("502 from the API gateway, retrying once");
            pacer.wait(RETRY_DELAY).await;
            match operation().await {
                Err(ApiError::BadGateway) => Err(ApiError::Unknown),
                other => other,
            }
        }
        other => other,
    }
}

#[async_trait]
impl ReportApi for CrxcavatorClient {
    async fn get(&self, path: &str) -> std::result::Result<Value, ApiError> {
        self.call(Method::GET, path, None).await
    }

    async fn post(&self, path: &str, body: Value) -> std::result::Result<Value, ApiError> {
        self.call(Method::POST, path, Some(&body)).await
    }
}

/// Outcome of submitting an extension for processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStatus {
    Accepted,
    /// The service does not know this extension identifier.
    UnknownExtension,
}

/// Fetch the full version-ordered report for an extension.
pub async fn fetch_report(api: &dyn ReportApi, id: &str) -> Result<Vec<ReportSnapshot>> {
    let value = api
        .get(&format!("/report/{}", id))
        .await
        .with_context(|| format!("Report request for {} failed", id))?;

    if value.is_null() {
        anyhow::bail!("No reports were found for extension {}", id);
    }

    serde_json::from_value(value).with_context(|| format!("Report for {} is malformed", id))
}

/// Submit an extension for the service to process.
pub async fn submit_extension(api: &dyn ReportApi, id: &str) -> Result<SubmitStatus> {
    let value = api
        .post("/submit", json!({ "extension_id": id }))
        .await
        .with_context(|| format!("Submission of {} failed", id))?;

    match value.get("code").and_then(Value::as_i64) {
        Some(UNKNOWN_EXTENSION_CODE) => Ok(SubmitStatus::UnknownExtension),
        _ => Ok(SubmitStatus::Accepted),
    }
}

/// Probe the configured API key; any non-error response means it is valid.
pub async fn test_api_key(api: &dyn ReportApi) -> Result<()> {
    api.get("/user/apikey")
        .await
        .context("API key test failed")?;
    Ok(())
}

/// Probe the configured base URI with a bare GET against the service root.
pub async fn test_api_uri(api: &dyn ReportApi) -> Result<bool> {
    let value = api.get("").await.context("API URI test failed")?;
    Ok(value.get("text").and_then(Value::as_str) == Some("CRXcavator"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingPacer {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Pacer for RecordingPacer {
        async fn wait(&self, duration: Duration) {
            self.waits.lock().unwrap().push(duration);
        }
    }

    #[tokio::test]
    async fn test_single_bad_gateway_retries_once() {
        let pacer = RecordingPacer::default();
        let attempts = AtomicUsize::new(0);

        let result = with_gateway_retry(&pacer, || {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt == 0 {
                    Err(ApiError::BadGateway)
                } else {
                    Ok(json!({ "ok": true }))
                }
            }
        })
        .await;

        assert_eq!(result.unwrap()["ok"], true);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
        assert_eq!(*pacer.waits.lock().unwrap(), vec![RETRY_DELAY]);
    }

    #[tokio::test]
    async fn test_second_bad_gateway_escalates() {
        let pacer = RecordingPacer::default();
        let attempts = AtomicUsize::new(0);

        let result = with_gateway_retry(&pacer, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::BadGateway) }
        })
        .await;

        assert_eq!(result, Err(ApiError::Unknown));
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_non_transient_failures_are_not_retried() {
        let pacer = RecordingPacer::default();
        let attempts = AtomicUsize::new(0);

        let result = with_gateway_retry(&pacer, || {
            attempts.fetch_add(1, Ordering::SeqCst);
            async { Err(ApiError::Unauthorized) }
        })
        .await;

        assert_eq!(result, Err(ApiError::Unauthorized));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
        assert!(pacer.waits.lock().unwrap().is_empty());
    }
}
