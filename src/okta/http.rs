//! HTTP transport for Okta admin API calls
//!
//! The resource layer never talks to the network directly. It hands a fully
//! formed [`HttpRequest`] to a [`Transport`] and gets back the raw status,
//! reason phrase and body. Non-2xx statuses are data here; deciding what
//! counts as success is the interpreter's job.

use crate::error::TransportError;
use serde::Deserialize;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default request deadline
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable bytes
pub fn sanitize_for_log(body: &[u8]) -> String {
    let text = String::from_utf8_lossy(body);
    let truncated = if text.chars().count() > MAX_LOG_BODY_LENGTH {
        let head: String = text.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        text.into_owned()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP method for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// A request ready to go over the wire
#[derive(Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

// Headers carry the API key, so they stay out of debug output.
impl fmt::Debug for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers.len())
            .field("body", &self.body.as_ref().map(|b| b.len()))
            .finish()
    }
}

/// What came back from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub reason: String,
    /// `None` when the backend sent no body at all
    pub body: Option<Vec<u8>>,
}

impl TransportResponse {
    pub fn new(status: u16, body: Option<Vec<u8>>) -> Self {
        Self {
            status,
            reason: reason_phrase(status),
            body,
        }
    }
}

/// Canonical reason phrase for a status code
pub fn reason_phrase(status: u16) -> String {
    reqwest::StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("Unknown")
        .to_string()
}

/// Executes requests against the backend.
///
/// Implementations report connection-level problems (DNS, TLS, timeout) as
/// [`TransportError`] and return every HTTP response, whatever its status,
/// as a [`TransportResponse`]. They never retry.
pub trait Transport: Send + Sync {
    fn execute(
        &self,
        request: &HttpRequest,
    ) -> impl Future<Output = Result<TransportResponse, TransportError>> + Send;
}

/// reqwest-backed transport
#[derive(Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a new transport with the given request deadline
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("oktactl/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<TransportResponse, TransportError> {
        tracing::debug!("{} {}", request.method, request.url);

        let mut builder = self
            .client
            .request(request.method.into(), request.url.as_str());

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(classify)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(classify)?;

        if !status.is_success() {
            tracing::warn!("API error: {} - {}", status, sanitize_for_log(&bytes));
        }

        Ok(TransportResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            body: if bytes.is_empty() {
                None
            } else {
                Some(bytes.to_vec())
            },
        })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Request(error.to_string())
    }
}

/// Short operator hint for a failed status, shown next to the backend's own
/// reason phrase
pub fn failure_hint(status: u16) -> Option<&'static str> {
    match status {
        401 => Some("Authentication failed. Check the API token."),
        403 => Some("Permission denied. The token's admin role cannot perform this action."),
        404 => Some("Resource not found."),
        429 => Some("Rate limit exceeded. Please try again later."),
        400 => Some("Invalid request. Check your parameters."),
        409 => Some("Resource conflict. The resource may already exist or be in use."),
        500 | 502 | 503 => Some("Okta service temporarily unavailable. Please try again."),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_truncates_long_bodies() {
        let body = "x".repeat(500);
        let sanitized = sanitize_for_log(body.as_bytes());
        assert!(sanitized.starts_with(&"x".repeat(MAX_LOG_BODY_LENGTH)));
        assert!(sanitized.contains("[truncated, 500 bytes total]"));
    }

    #[test]
    fn test_sanitize_strips_control_characters() {
        assert_eq!(sanitize_for_log(b"{\"a\":\n1}\t"), "{\"a\":1}");
    }

    #[test]
    fn test_reason_phrase() {
        assert_eq!(reason_phrase(204), "No Content");
        assert_eq!(reason_phrase(500), "Internal Server Error");
        assert_eq!(reason_phrase(599), "Unknown");
    }

    #[test]
    fn test_request_debug_hides_headers() {
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "https://acme-admin.okta.com/api/v1/users/".to_string(),
            headers: vec![("Authorization".to_string(), "SSWS secret".to_string())],
            body: None,
        };
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_failure_hint() {
        assert!(failure_hint(401).is_some());
        assert!(failure_hint(418).is_none());
    }
}
