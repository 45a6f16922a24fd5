//! Observable shape of a failed SDK call.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Error body the exchange returns for rejected requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExchangeErrorBody {
    pub code: i64,
    #[serde(default)]
    pub msg: String,
}

/// A failed call made by an SDK under test.
///
/// Carries whatever the SDK exposed about the failure. The classifier reads
/// the status, body and message; the harness never interprets them further.
#[derive(Debug, Clone, Default, Error)]
#[error("{message}")]
pub struct CallError {
    pub message: String,
    pub status: Option<u16>,
    pub content_type: Option<String>,
    pub body: String,
    pub timed_out: bool,
}

impl CallError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// HTTP failure as reported by an SDK that surfaces status and body.
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            message: format!("HTTP {}: {}", status, preview(&body)),
            status: Some(status),
            body,
            ..Default::default()
        }
    }

    pub fn timeout(after: Duration) -> Self {
        Self {
            message: format!("timeout after {:.1}s", after.as_secs_f64()),
            timed_out: true,
            ..Default::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Consume a non-success response into an error.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(status, error = %e, "Failed to read error response body");
                String::new()
            }
        };

        let mut err = Self::http(status, body);
        err.content_type = content_type;
        err
    }

    /// Pass a success response through, turn anything else into an error.
    pub async fn check(response: reqwest::Response) -> Result<reqwest::Response, Self> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::from_response(response).await)
        }
    }

    /// Parsed `{code, msg}` body, if the body has that shape.
    pub fn exchange_error(&self) -> Option<ExchangeErrorBody> {
        serde_json::from_str(&self.body).ok()
    }

    pub fn is_timeout(&self) -> bool {
        self.timed_out
    }
}

impl From<reqwest::Error> for CallError {
    fn from(err: reqwest::Error) -> Self {
        let mut message = error_chain(&err);
        if err.is_timeout() && !message.to_ascii_lowercase().contains("timeout") {
            message = format!("timeout: {}", message);
        }
        Self {
            message,
            status: err.status().map(|s| s.as_u16()),
            timed_out: err.is_timeout(),
            ..Default::default()
        }
    }
}

/// `err` followed by each of its sources, joined with `": "`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

impl From<crate::Error> for CallError {
    fn from(err: crate::Error) -> Self {
        match err {
            crate::Error::Network(e) => e.into(),
            crate::Error::Timeout(after) => Self::timeout(after),
            other => Self::new(other.to_string()),
        }
    }
}

fn preview(body: &str) -> &str {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body;
    }
    let mut end = MAX;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_error_parse() {
        let err = CallError::http(400, r#"{"code":-1102,"msg":"Mandatory parameter 'symbol' was not sent"}"#);
        let parsed = err.exchange_error().unwrap();
        assert_eq!(parsed.code, -1102);
        assert!(parsed.msg.contains("symbol"));
        assert!(err.to_string().contains("HTTP 400"));
    }

    #[test]
    fn test_exchange_error_unparseable() {
        assert!(CallError::http(500, "<html>oops</html>").exchange_error().is_none());
        assert!(CallError::http(404, "").exchange_error().is_none());
    }

    #[test]
    fn test_code_only_body() {
        let parsed = CallError::http(400, r#"{"code":-1102}"#).exchange_error().unwrap();
        assert_eq!(parsed.code, -1102);
        assert!(parsed.msg.is_empty());
    }

    #[tokio::test]
    async fn test_reqwest_timeout_keeps_signal() {
        use wiremock::matchers::path;
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(path("/api/v3/ping"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let err = reqwest::Client::new()
            .get(format!("{}/api/v3/ping", server.uri()))
            .timeout(Duration::from_millis(100))
            .send()
            .await
            .unwrap_err();
        let err = CallError::from(err);

        assert!(err.is_timeout());
        assert!(err.message.starts_with("timeout: "), "{}", err.message);
        assert!(err.message.contains("/api/v3/ping"));
    }

    #[derive(Debug, thiserror::Error)]
    #[error("error sending request")]
    struct SendError(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_sources() {
        let err = SendError(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "operation timed out",
        ));
        assert_eq!(error_chain(&err), "error sending request: operation timed out");
    }

    #[test]
    fn test_timeout() {
        let err = CallError::timeout(Duration::from_secs(30));
        assert!(err.is_timeout());
        assert!(err.status.is_none());
        assert!(err.to_string().contains("30.0s"));
    }

    #[test]
    fn test_message_preview_is_bounded() {
        let body = "é".repeat(300);
        let err = CallError::http(502, body.clone());
        assert!(err.message.len() < body.len());
        assert_eq!(err.body, body);
    }

    #[test]
    fn test_from_harness_error() {
        let err: CallError = crate::Error::Timeout(Duration::from_secs(5)).into();
        assert!(err.timed_out);
        let err: CallError = crate::Error::Config("bad".into()).into();
        assert!(err.message.contains("bad"));
    }
}
