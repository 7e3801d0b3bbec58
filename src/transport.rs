//! The single-exchange HTTP layer.
//!
//! A [`Transport`] performs exactly one HTTP exchange per call and knows nothing
//! about retries, caching or status classification. [`HttpTransport`] is the
//! `reqwest` implementation used by default; tests and embedders can supply
//! their own through [`ClientBuilder::transport`](crate::ClientBuilder::transport).

use crate::{request::Request, Error, Response, Result};
use async_trait::async_trait;
use http::{header::CONTENT_LENGTH, HeaderMap, Method};
use std::fmt;
use std::time::Duration;
use url::Url;

/// Performs one HTTP exchange.
///
/// Implementations return `Ok` whenever the server produced a status, whatever
/// that status is. An `Err` that reports [`Error::is_transient`] means no status
/// was obtained; the client retries those. Any other `Err` is surfaced as is.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `request` and returns the server's answer.
    async fn execute(&self, request: &Request) -> Result<Response>;
}

/// HTTP Basic credentials attached to every request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a username/password pair.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The account name.
    pub fn username(&self) -> &str {
        &self.username
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// [`Transport`] backed by a pooled `reqwest::Client`.
pub struct HttpTransport {
    http_client: reqwest::Client,
    base_url: Url,
    credentials: Option<Credentials>,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl HttpTransport {
    pub(crate) fn new(
        http_client: reqwest::Client,
        base_url: Url,
        credentials: Option<Credentials>,
        default_headers: HeaderMap,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            http_client,
            base_url,
            credentials,
            default_headers,
            timeout,
        }
    }

    /// Resolves a relative path against the base URL, keeping the base path.
    ///
    /// `https://api.bitbucket.org/1.0` + `user/follows` gives
    /// `https://api.bitbucket.org/1.0/user/follows`.
    fn endpoint(&self, path: &str) -> Result<Url> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Ok(Url::parse(&format!(
            "{}/{}",
            base,
            path.trim_start_matches('/')
        ))?)
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &Request) -> Result<Response> {
        let url = self.endpoint(request.path())?;

        tracing::debug!(
            method = %request.method(),
            url = %url,
            "Executing HTTP request"
        );

        let mut builder = self.http_client.request(request.method().clone(), url);

        for (name, value) in &self.default_headers {
            builder = builder.header(name, value);
        }

        if let Some(credentials) = &self.credentials {
            builder = builder.basic_auth(credentials.username(), Some(credentials.password()));
        }

        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        if let Some(params) = request.params() {
            builder = if request.has_form_body() {
                builder.form(params)
            } else {
                builder.query(params)
            };
        }

        if request.is_zero_length() {
            builder = builder.header(CONTENT_LENGTH, "0");
        }

        let response = builder.send().await.map_err(Error::from_transport)?;
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| Error::from_body_read(status, e))?;

        Ok(Response::new(status, headers, body))
    }
}

impl fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url.as_str())
            .field("credentials", &self.credentials)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Returns `true` if the method is one the Bitbucket 1.0 API accepts.
pub(crate) fn is_supported_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::PUT | Method::POST | Method::DELETE
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport(base: &str) -> HttpTransport {
        HttpTransport::new(
            reqwest::Client::new(),
            Url::parse(base).unwrap(),
            Some(Credentials::new("alice", "secret")),
            HeaderMap::new(),
            None,
        )
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let transport = transport("https://api.bitbucket.org/1.0");
        let url = transport.endpoint("user/follows").unwrap();
        assert_eq!(url.as_str(), "https://api.bitbucket.org/1.0/user/follows");
    }

    #[test]
    fn test_endpoint_normalizes_slashes() {
        let transport = transport("https://api.bitbucket.org/1.0/");
        let url = transport.endpoint("/users/alice").unwrap();
        assert_eq!(url.as_str(), "https://api.bitbucket.org/1.0/users/alice");
    }

    #[test]
    fn test_endpoint_keeps_query_string() {
        let transport = transport("https://api.bitbucket.org/1.0");
        let url = transport
            .endpoint("repositories/acme/widget/issues?start=15")
            .unwrap();
        assert_eq!(url.query(), Some("start=15"));
    }

    #[test]
    fn test_credentials_debug_hides_password() {
        let debug = format!("{:?}", Credentials::new("alice", "secret"));
        assert!(debug.contains("alice"));
        assert!(!debug.contains("secret"));
    }

    #[test]
    fn test_supported_methods() {
        assert!(is_supported_method(&Method::DELETE));
        assert!(!is_supported_method(&Method::PATCH));
    }
}
