//! Error types for Bitbucket API calls.
//!
//! Every failure a call can end in is a variant of [`Error`]. Connection-level
//! failures ([`Error::Network`], [`Error::Timeout`]) are the only ones the client
//! retries; once the retry budget is spent they are wrapped in
//! [`Error::NoConnection`]. HTTP-level failures carry the original status code
//! together with a [`StatusKind`] so callers can tell "not found" from
//! "server error" from "offline".

use http::{HeaderMap, StatusCode};

/// The main error type for Bitbucket API calls.
///
/// # Examples
///
/// ```no_run
/// use bitbucket_rest::{Client, Error, StatusKind};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder()
///     .credentials("alice", "app-password")
///     .build()?;
///
/// match client.get::<serde_json::Value>("repositories/acme/widget").await {
///     Ok(repo) => println!("Found: {}", repo),
///     Err(Error::HttpError { kind: StatusKind::NotFound, .. }) => {
///         eprintln!("No such repository");
///     }
///     Err(Error::NoConnection { attempts, .. }) => {
///         eprintln!("Offline after {} attempts", attempts);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The caller supplied an unusable argument, such as an empty request path.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A network-level error occurred (connection refused, DNS lookup failed, reset, etc.).
    ///
    /// No HTTP status was obtained, so the attempt counts against the retry budget.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out before any status was received.
    #[error("Request timed out")]
    Timeout,

    /// Every attempt failed without producing an HTTP status.
    ///
    /// # Fields
    ///
    /// * `attempts` - The number of transport attempts made (`retries + 1`)
    /// * `last_error` - The connection failure seen on the final attempt
    #[error("Unable to execute request, no connection available after {attempts} attempts: {last_error}")]
    NoConnection {
        /// The number of attempts made
        attempts: usize,
        /// The last error encountered
        last_error: Box<Error>,
    },

    /// The server answered with a non-success status.
    ///
    /// These are never retried.
    ///
    /// # Fields
    ///
    /// * `status` - The HTTP status code
    /// * `kind` - The classification of `status`
    /// * `raw_response` - The raw response body
    /// * `headers` - The response headers
    #[error("HTTP error {status} ({kind}): {raw_response}")]
    HttpError {
        /// The HTTP status code
        status: StatusCode,
        /// The status family this code belongs to
        kind: StatusKind,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// Failed to deserialize the response body (or a cached document) into the expected type.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body that failed to deserialize
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The status line arrived but the body could not be read.
    ///
    /// The server has already seen the request, so this is never retried.
    #[error("Failed to read response body (status {status}): {reason}")]
    BodyReadFailed {
        /// The HTTP status code that was received
        status: StatusCode,
        /// Why reading the body failed
        reason: String,
    },

    /// A payload could not be turned into form parameters.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// Invalid configuration was provided to the [`ClientBuilder`](crate::ClientBuilder).
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// An invalid URL was provided or produced.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl Error {
    /// Builds the error for a non-success response.
    pub(crate) fn from_status(status: StatusCode, raw_response: String, headers: HeaderMap) -> Self {
        Error::HttpError {
            status,
            kind: StatusKind::from_status(status),
            raw_response,
            headers,
        }
    }

    /// Builds the error for a failure before any status arrived.
    ///
    /// A request reqwest refuses to build is the caller's problem and is not
    /// retried; timeouts and everything else are connection failures.
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_builder() {
            Error::InvalidArgument(format!("Could not build request: {}", err))
        } else if err.is_timeout() {
            Error::Timeout
        } else {
            Error::Network(err)
        }
    }

    /// Builds the error for a body that failed to arrive after `status` did.
    pub(crate) fn from_body_read(status: StatusCode, err: reqwest::Error) -> Self {
        Error::BodyReadFailed {
            status,
            reason: err.to_string(),
        }
    }

    /// Returns `true` if the failure happened before any HTTP status was received.
    ///
    /// Only transient errors consume a retry; everything else surfaces immediately.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitbucket_rest::Error;
    ///
    /// assert!(Error::Timeout.is_transient());
    /// assert!(!Error::InvalidArgument("path".to_string()).is_transient());
    /// ```
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Timeout => true,
            Error::InvalidArgument(_) => false,
            Error::NoConnection { .. } => false,
            Error::HttpError { .. } => false,
            Error::DeserializationFailed { .. } => false,
            Error::BodyReadFailed { .. } => false,
            Error::SerializationFailed(_) => false,
            Error::ConfigurationError(_) => false,
            Error::InvalidUrl(_) => false,
        }
    }

    /// Returns the HTTP status code if this error has one.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::HttpError { status, .. } => Some(*status),
            Error::DeserializationFailed { status, .. } => Some(*status),
            Error::BodyReadFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the status classification for HTTP errors.
    pub fn kind(&self) -> Option<StatusKind> {
        match self {
            Error::HttpError { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    /// Returns the raw response body if this error has one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::HttpError { raw_response, .. } => Some(raw_response),
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }

    /// Shorthand for `kind() == Some(StatusKind::NotFound)`.
    pub fn is_not_found(&self) -> bool {
        self.kind() == Some(StatusKind::NotFound)
    }
}

/// Classification of a non-success HTTP status.
///
/// | Kind | Status |
/// |------|--------|
/// | `BadRequest` | 400 |
/// | `Unauthorized` | 401 |
/// | `Forbidden` | 403 |
/// | `NotFound` | 404 |
/// | `MethodNotAllowed` | 405 |
/// | `Conflict` | 409 |
/// | `Gone` | 410 |
/// | `TooManyRequests` | 429 |
/// | `OtherClientError` | any other 4xx |
/// | `InternalServerError` | 500 |
/// | `BadGateway` | 502 |
/// | `ServiceUnavailable` | 503 |
/// | `GatewayTimeout` | 504 |
/// | `OtherServerError` | any other 5xx |
/// | `Unexpected` | 1xx, 3xx, anything else |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// 400, the request was malformed
    BadRequest,
    /// 401, credentials are missing or wrong
    Unauthorized,
    /// 403, the account may not access the resource
    Forbidden,
    /// 404, no such resource
    NotFound,
    /// 405, the resource does not accept this method
    MethodNotAllowed,
    /// 409, the change conflicts with the resource's current state
    Conflict,
    /// 410, the resource was removed for good
    Gone,
    /// 429, the server is throttling this client
    TooManyRequests,
    /// Any other 4xx
    OtherClientError,
    /// 500, the server failed while handling the request
    InternalServerError,
    /// 502, an upstream server sent an invalid answer
    BadGateway,
    /// 503, the server is down or in maintenance
    ServiceUnavailable,
    /// 504, an upstream server did not answer in time
    GatewayTimeout,
    /// Any other 5xx
    OtherServerError,
    /// A status outside 2xx, 4xx and 5xx
    Unexpected,
}

impl StatusKind {
    /// Maps a status code to its kind.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitbucket_rest::StatusKind;
    /// use http::StatusCode;
    ///
    /// assert_eq!(StatusKind::from_status(StatusCode::NOT_FOUND), StatusKind::NotFound);
    /// assert_eq!(StatusKind::from_status(StatusCode::IM_A_TEAPOT), StatusKind::OtherClientError);
    /// ```
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            400 => StatusKind::BadRequest,
            401 => StatusKind::Unauthorized,
            403 => StatusKind::Forbidden,
            404 => StatusKind::NotFound,
            405 => StatusKind::MethodNotAllowed,
            409 => StatusKind::Conflict,
            410 => StatusKind::Gone,
            429 => StatusKind::TooManyRequests,
            500 => StatusKind::InternalServerError,
            502 => StatusKind::BadGateway,
            503 => StatusKind::ServiceUnavailable,
            504 => StatusKind::GatewayTimeout,
            _ if status.is_client_error() => StatusKind::OtherClientError,
            _ if status.is_server_error() => StatusKind::OtherServerError,
            _ => StatusKind::Unexpected,
        }
    }

    /// Returns `true` for 4xx kinds.
    pub fn is_client_error(self) -> bool {
        matches!(
            self,
            StatusKind::BadRequest
                | StatusKind::Unauthorized
                | StatusKind::Forbidden
                | StatusKind::NotFound
                | StatusKind::MethodNotAllowed
                | StatusKind::Conflict
                | StatusKind::Gone
                | StatusKind::TooManyRequests
                | StatusKind::OtherClientError
        )
    }

    /// Returns `true` for 5xx kinds.
    pub fn is_server_error(self) -> bool {
        matches!(
            self,
            StatusKind::InternalServerError
                | StatusKind::BadGateway
                | StatusKind::ServiceUnavailable
                | StatusKind::GatewayTimeout
                | StatusKind::OtherServerError
        )
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            StatusKind::BadRequest => "bad request",
            StatusKind::Unauthorized => "unauthorized",
            StatusKind::Forbidden => "forbidden",
            StatusKind::NotFound => "not found",
            StatusKind::MethodNotAllowed => "method not allowed",
            StatusKind::Conflict => "conflict",
            StatusKind::Gone => "gone",
            StatusKind::TooManyRequests => "too many requests",
            StatusKind::OtherClientError => "client error",
            StatusKind::InternalServerError => "internal server error",
            StatusKind::BadGateway => "bad gateway",
            StatusKind::ServiceUnavailable => "service unavailable",
            StatusKind::GatewayTimeout => "gateway timeout",
            StatusKind::OtherServerError => "server error",
            StatusKind::Unexpected => "unexpected status",
        };
        f.write_str(text)
    }
}

/// A specialized `Result` type for Bitbucket API calls.
///
/// This is a convenience alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
