//! The request engine.
//!
//! The [`Client`] type is the main entry point for talking to the API. Every
//! operation funnels into [`Client::execute`], which validates the request,
//! runs the retry loop against the configured [`Transport`] and classifies the
//! result. GETs additionally go through the configured [`CacheProvider`].
//! Use [`ClientBuilder`] to configure and create clients.

use crate::{
    cache::{CacheProvider, NoCache},
    request::{to_params, Params, Request},
    retry::{RetryBudget, State},
    transport::{is_supported_method, Credentials, HttpTransport, Transport},
    Error, Response, Result,
};
use http::{header::USER_AGENT, HeaderMap, HeaderName, HeaderValue, Method};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Base URL of the Bitbucket 1.0 REST API.
pub const API_URL: &str = "https://api.bitbucket.org/1.0";

/// Base URL of the Bitbucket website.
pub const WEB_URL: &str = "https://bitbucket.org";

const DEFAULT_USER_AGENT: &str = concat!("bitbucket-rest/", env!("CARGO_PKG_VERSION"));

/// A Bitbucket API client with caching, retries and typed results.
///
/// The client is designed to be reused across many calls. Clones are cheap and
/// share the same transport, credentials and cache.
///
/// # Examples
///
/// ```no_run
/// use bitbucket_rest::{cache::MemoryCache, Client};
/// use serde::{Deserialize, Serialize};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[derive(Serialize, Deserialize)]
/// struct Repo {
///     name: String,
///     slug: String,
/// }
///
/// # async fn example() -> Result<(), bitbucket_rest::Error> {
/// let client = Client::builder()
///     .credentials("alice", "app-password")
///     .timeout(Duration::from_secs(30))
///     .retries(2)
///     .cache(Arc::new(MemoryCache::new()))
///     .build()?;
///
/// // Served from the network, then from the cache
/// let repo: Repo = client.get("repositories/acme/widget").await?;
/// let again: Repo = client.get("repositories/acme/widget").await?;
/// assert_eq!(repo.slug, again.slug);
///
/// // Skip the cache and refresh the entry
/// let fresh: Repo = client.get_with("repositories/acme/widget", true).await?;
/// println!("{}", fresh.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    cache: Arc<dyn CacheProvider>,
    retry_budget: RetryBudget,
    username: Option<String>,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client for the public API with default settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client can't be created.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        ClientBuilder::new().credentials(username, password).build()
    }

    /// The account name the client authenticates as, if any.
    pub fn username(&self) -> Option<&str> {
        self.inner.username.as_deref()
    }

    /// The retry budget applied to every call.
    pub fn retry_budget(&self) -> RetryBudget {
        self.inner.retry_budget
    }

    /// The cache provider in use.
    pub fn cache(&self) -> &Arc<dyn CacheProvider> {
        &self.inner.cache
    }

    /// Executes a request and returns the raw successful response.
    ///
    /// This is the funnel every other method goes through. It makes at most
    /// `retries + 1` transport attempts, retrying only when no HTTP status was
    /// obtained. Any non-success status fails the call immediately.
    ///
    /// # Errors
    ///
    /// * [`Error::InvalidArgument`] if the path is empty or the method isn't
    ///   GET, PUT, POST or DELETE
    /// * [`Error::HttpError`] for any non-success status
    /// * [`Error::NoConnection`] once every attempt failed without a status
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bitbucket_rest::{request::Request, Client};
    /// use http::Method;
    ///
    /// # async fn example() -> Result<(), bitbucket_rest::Error> {
    /// let client = Client::new("alice", "app-password")?;
    ///
    /// let request = Request::new(Method::GET, "users/alice/events")
    ///     .with_params(vec![("limit".to_string(), "5".to_string())]);
    /// let response = client.execute(request).await?;
    /// println!("{}", response.body);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute(&self, request: Request) -> Result<Response> {
        if request.path().trim().is_empty() {
            return Err(Error::InvalidArgument(
                "request path must not be empty".to_string(),
            ));
        }
        if !is_supported_method(request.method()) {
            return Err(Error::InvalidArgument(format!(
                "unsupported method {}",
                request.method()
            )));
        }

        let start_time = Instant::now();
        let mut attempt = 1;

        loop {
            let outcome = self.inner.transport.execute(&request).await;

            match self
                .inner
                .retry_budget
                .next(request.method(), attempt, outcome)
            {
                State::Attempting { next, cause } => {
                    tracing::warn!(
                        error = %cause,
                        attempt = attempt,
                        method = %request.method(),
                        path = %request.path(),
                        "No response from server, retrying"
                    );
                    attempt = next;
                }
                State::Succeeded(response) => {
                    tracing::info!(
                        status = response.status.as_u16(),
                        latency_ms = start_time.elapsed().as_millis(),
                        attempts = attempt,
                        method = %request.method(),
                        path = %request.path(),
                        "Received HTTP response"
                    );
                    return Ok(response);
                }
                State::FailedApplication(e) => {
                    match e.status() {
                        Some(status) if status.is_server_error() => tracing::warn!(
                            status = status.as_u16(),
                            method = %request.method(),
                            path = %request.path(),
                            "Server error (5xx)"
                        ),
                        Some(status) => tracing::error!(
                            status = status.as_u16(),
                            method = %request.method(),
                            path = %request.path(),
                            "Request rejected"
                        ),
                        None => tracing::error!(
                            error = %e,
                            method = %request.method(),
                            path = %request.path(),
                            "Request failed"
                        ),
                    }
                    return Err(e);
                }
                State::FailedFatal(e) => {
                    tracing::error!(
                        error = %e,
                        attempts = attempt,
                        method = %request.method(),
                        path = %request.path(),
                        "Giving up, no connection available"
                    );
                    return Err(e);
                }
            }
        }
    }

    /// Makes a GET request, answering from the cache when possible.
    ///
    /// Equivalent to `get_with(path, false)`.
    pub async fn get<T>(&self, path: impl Into<String>) -> Result<T>
    where
        T: DeserializeOwned + Serialize,
    {
        self.get_with(path, false).await
    }

    /// Makes a GET request, optionally bypassing the cache.
    ///
    /// Unless `force_bypass_cache` is set, a cached entry that deserializes into
    /// `T` is returned without touching the network. An entry of a different
    /// shape counts as a miss. A result fetched from the network is written to
    /// the cache under `path` before it is returned, including on a bypass.
    pub async fn get_with<T>(&self, path: impl Into<String>, force_bypass_cache: bool) -> Result<T>
    where
        T: DeserializeOwned + Serialize,
    {
        let path = path.into();
        let cache = &self.inner.cache;

        if !force_bypass_cache {
            if let Some(value) = cache.get(&path) {
                match serde_json::from_value::<T>(value) {
                    Ok(data) => {
                        tracing::debug!(path = %path, "Cache hit");
                        return Ok(data);
                    }
                    Err(e) => tracing::debug!(
                        path = %path,
                        error = %e,
                        "Cached entry has a different shape, fetching"
                    ),
                }
            }
        }

        let response = self.execute(Request::new(Method::GET, path.as_str())).await?;
        let data: T = response.json()?;

        if cache.is_enabled() {
            match serde_json::to_value(&data) {
                Ok(value) => cache.set(&path, value),
                Err(e) => tracing::warn!(
                    path = %path,
                    error = %e,
                    "Result could not be cached"
                ),
            }
        }

        Ok(data)
    }

    /// Makes a PUT request with `data` form-encoded and deserializes the response.
    ///
    /// Passing `None` sends an explicitly empty body (`Content-Length: 0`).
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bitbucket_rest::Client;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct Rename {
    ///     name: String,
    /// }
    ///
    /// # async fn example() -> Result<(), bitbucket_rest::Error> {
    /// let client = Client::new("alice", "app-password")?;
    /// let renamed: serde_json::Value = client
    ///     .put("repositories/acme/widget", Some(&Rename { name: "Gizmo".to_string() }))
    ///     .await?;
    ///
    /// // No payload at all
    /// client.put_unit::<()>("repositories/acme/widget/follow", None).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn put<T, D>(&self, path: impl Into<String>, data: Option<&D>) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        let params = data.map(to_params).transpose()?;
        self.put_params(path, params).await
    }

    /// Makes a PUT request with ready-made parameters and deserializes the response.
    ///
    /// `None` is the zero-length PUT; `Some(vec![])` is an empty form body.
    pub async fn put_params<T>(&self, path: impl Into<String>, params: Option<Params>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(with_data(Method::PUT, path, params))
            .await?
            .json()
    }

    /// Makes a PUT request and ignores the response body.
    pub async fn put_unit<D>(&self, path: impl Into<String>, data: Option<&D>) -> Result<()>
    where
        D: Serialize + ?Sized,
    {
        let params = data.map(to_params).transpose()?;
        self.execute(with_data(Method::PUT, path, params)).await?;
        Ok(())
    }

    /// Makes a POST request with `data` form-encoded and deserializes the response.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use bitbucket_rest::Client;
    /// use serde::Serialize;
    ///
    /// #[derive(Serialize)]
    /// struct NewComment {
    ///     content: String,
    /// }
    ///
    /// # async fn example() -> Result<(), bitbucket_rest::Error> {
    /// let client = Client::new("alice", "app-password")?;
    /// let comment: serde_json::Value = client
    ///     .post(
    ///         "repositories/acme/widget/issues/5/comments",
    ///         &NewComment { content: "Still happens on 2.1".to_string() },
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn post<T, D>(&self, path: impl Into<String>, data: &D) -> Result<T>
    where
        T: DeserializeOwned,
        D: Serialize + ?Sized,
    {
        self.post_params(path, to_params(data)?).await
    }

    /// Makes a POST request with ready-made parameters and deserializes the response.
    pub async fn post_params<T>(&self, path: impl Into<String>, params: Params) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.execute(Request::new(Method::POST, path).with_params(params))
            .await?
            .json()
    }

    /// Makes a POST request and ignores the response body.
    pub async fn post_unit<D>(&self, path: impl Into<String>, data: &D) -> Result<()>
    where
        D: Serialize + ?Sized,
    {
        let request = Request::new(Method::POST, path).with_params(to_params(data)?);
        self.execute(request).await?;
        Ok(())
    }

    /// Makes a DELETE request.
    ///
    /// Any body in the response, including none at all, is ignored.
    pub async fn delete(&self, path: impl Into<String>) -> Result<()> {
        self.execute(Request::new(Method::DELETE, path)).await?;
        Ok(())
    }

    /// Drops every cached entry whose path starts with `prefix`.
    ///
    /// Writes never invalidate anything on their own; callers that know which
    /// reads a mutation affects invalidate them explicitly.
    pub fn invalidate(&self, prefix: &str) {
        tracing::debug!(prefix = %prefix, "Invalidating cache entries");
        self.inner.cache.delete_where_starting_with(prefix);
    }
}

fn with_data(method: Method, path: impl Into<String>, data: Option<Params>) -> Request {
    let request = Request::new(method, path);
    match data {
        Some(params) => request.with_params(params),
        None => request,
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// Defaults: the public Bitbucket 1.0 API, no credentials, 3 retries, no
/// timeout beyond the HTTP stack's own, and [`NoCache`].
///
/// # Examples
///
/// ```no_run
/// use bitbucket_rest::{cache::FileCache, ClientBuilder};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// # fn example() -> Result<(), bitbucket_rest::Error> {
/// let client = ClientBuilder::new()
///     .base_url("https://bitbucket.example.com/api/1.0")?
///     .credentials("alice", "app-password")
///     .timeout(Duration::from_secs(30))
///     .retries(5)
///     .cache(Arc::new(FileCache::open("/tmp/bitbucket-cache.json")))
///     .default_header("User-Agent", "my-app/1.0")?
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    base_url: Option<Url>,
    credentials: Option<Credentials>,
    default_headers: HeaderMap,
    retry_budget: RetryBudget,
    timeout: Option<Duration>,
    cache: Arc<dyn CacheProvider>,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Self {
            base_url: None,
            credentials: None,
            default_headers,
            retry_budget: RetryBudget::default(),
            timeout: None,
            cache: Arc::new(NoCache),
            transport: None,
        }
    }

    /// Sets the base URL all request paths are relative to.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is invalid.
    pub fn base_url(mut self, url: impl AsRef<str>) -> Result<Self> {
        self.base_url = Some(Url::parse(url.as_ref())?);
        Ok(self)
    }

    /// Sets the HTTP Basic credentials sent with every request.
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(username, password));
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets how many times a call is retried after a connection failure.
    pub fn retries(mut self, retries: usize) -> Self {
        self.retry_budget = RetryBudget::new(retries);
        self
    }

    /// Sets the timeout applied to every transport attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the cache provider consulted by GET requests.
    pub fn cache(mut self, cache: Arc<dyn CacheProvider>) -> Self {
        self.cache = cache;
        self
    }

    /// Replaces the HTTP transport.
    ///
    /// When set, the base URL, credentials, headers and timeout configured on
    /// this builder are not used; the transport is responsible for them.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL isn't HTTP(S) or if the HTTP client
    /// can't be created.
    pub fn build(self) -> Result<Client> {
        let username = self
            .credentials
            .as_ref()
            .map(|credentials| credentials.username().to_string());

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let base_url = match self.base_url {
                    Some(url) => url,
                    None => Url::parse(API_URL)?,
                };
                if !matches!(base_url.scheme(), "http" | "https") {
                    return Err(Error::ConfigurationError(format!(
                        "Base URL must be http or https, got {}",
                        base_url.scheme()
                    )));
                }

                let http_client = reqwest::Client::builder().build().map_err(|e| {
                    Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
                })?;

                Arc::new(HttpTransport::new(
                    http_client,
                    base_url,
                    self.credentials,
                    self.default_headers,
                    self.timeout,
                ))
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                cache: self.cache,
                retry_budget: self.retry_budget,
                username,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let client = Client::builder().build().unwrap();
        assert_eq!(client.retry_budget().retries(), 3);
        assert!(!client.cache().is_enabled());
        assert_eq!(client.username(), None);
    }

    #[test]
    fn test_builder_rejects_non_http_base() {
        let result = Client::builder()
            .base_url("ftp://bitbucket.org")
            .unwrap()
            .build();
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_builder_rejects_bad_header() {
        let result = Client::builder().default_header("bad header", "x");
        assert!(matches!(result, Err(Error::ConfigurationError(_))));
    }

    #[test]
    fn test_new_keeps_username() {
        let client = Client::new("alice", "secret").unwrap();
        assert_eq!(client.username(), Some("alice"));
    }
}
