//! The outcome of a single transport attempt.
//!
//! A [`Response`] only exists when the server produced an HTTP status. Failures
//! that never reach that point are reported as transport errors instead, which
//! is what lets the client tell a retryable connection problem apart from a
//! deterministic HTTP error.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

/// Status, headers and body text of one HTTP exchange.
///
/// # Examples
///
/// ```
/// use bitbucket_rest::Response;
/// use http::{HeaderMap, StatusCode};
///
/// let response = Response::new(StatusCode::OK, HeaderMap::new(), r#"{"id": 7}"#);
///
/// assert!(response.is_success());
/// let value: serde_json::Value = response.json().unwrap();
/// assert_eq!(value["id"], 7);
/// ```
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The raw response body as a string.
    pub body: String,
}

impl Response {
    /// Creates a new `Response`.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<String>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Returns `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Deserializes the body into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`](crate::Error::DeserializationFailed)
    /// with the raw body preserved if the body doesn't match `T`.
    pub fn json<T>(&self) -> crate::Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(&self.body).map_err(|e| {
            tracing::error!(
                error = %e,
                raw_response = %self.body,
                "Failed to deserialize response"
            );
            crate::Error::DeserializationFailed {
                raw_response: self.body.clone(),
                serde_error: e.to_string(),
                status: self.status,
            }
        })
    }

    /// Returns a reference to a header value by name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Converts a non-success response into the matching error.
    pub(crate) fn into_error(self) -> crate::Error {
        crate::Error::from_status(self.status, self.body, self.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, StatusKind};
    use http::HeaderValue;

    #[test]
    fn test_json_failure_keeps_raw_body() {
        let response = Response::new(StatusCode::OK, HeaderMap::new(), "<html>oops</html>");

        match response.json::<serde_json::Value>() {
            Err(Error::DeserializationFailed {
                raw_response,
                status,
                ..
            }) => {
                assert_eq!(raw_response, "<html>oops</html>");
                assert_eq!(status, StatusCode::OK);
            }
            other => panic!("Expected DeserializationFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_into_error_classifies() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc"));
        let response = Response::new(StatusCode::CONFLICT, headers, "exists");

        assert_eq!(response.header("x-request-id"), Some("abc"));
        let err = response.into_error();
        assert_eq!(err.kind(), Some(StatusKind::Conflict));
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }
}
