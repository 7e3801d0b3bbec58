//! # bitbucket-rest - A typed client for the Bitbucket 1.0 REST API
//!
//! Resources are exposed as typed async operations instead of raw HTTP calls.
//! Authentication, response caching, retrying of dropped connections and JSON
//! mapping all happen inside the [`Client`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use bitbucket_rest::{cache::MemoryCache, Client};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), bitbucket_rest::Error> {
//!     let client = Client::builder()
//!         .credentials("alice", "app-password")
//!         .timeout(Duration::from_secs(30))
//!         .retries(3)
//!         .cache(Arc::new(MemoryCache::new()))
//!         .build()?;
//!
//!     let repo = client.repository("acme", "widget").get().await?;
//!     println!("{} ({})", repo.name, repo.scm.unwrap_or_default());
//!
//!     let issues = client.repository("acme", "widget").issues().all().await?;
//!     for issue in issues.issues {
//!         println!("#{} {}", issue.local_id, issue.title);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed results** - Every call deserializes into the type you ask for
//! - **Connection retries** - Calls that get no HTTP response are retried up to a configured budget
//! - **Status classification** - Error statuses surface immediately as [`Error::HttpError`] with a [`StatusKind`]
//! - **Pluggable caching** - GET results are cached by path in a [`cache::CacheProvider`] of your choice
//! - **Logging** - Structured logging with `tracing`
//!
//! ## Error Handling
//!
//! ```no_run
//! use bitbucket_rest::{Client, Error, StatusKind};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new("alice", "app-password")?;
//! match client.repository("acme", "widget").get().await {
//!     Ok(repo) => println!("Found {}", repo.slug),
//!     Err(Error::HttpError { kind: StatusKind::NotFound, .. }) => {
//!         eprintln!("No such repository");
//!     }
//!     Err(Error::HttpError { status, raw_response, .. }) => {
//!         eprintln!("HTTP error {}: {}", status, raw_response);
//!     }
//!     Err(Error::NoConnection { attempts, .. }) => {
//!         eprintln!("Offline, gave up after {} attempts", attempts);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Caching
//!
//! Only GETs are cached, keyed by their exact path. Writes never invalidate
//! anything by themselves; the resource wrappers in [`api`] invalidate the
//! paths a mutation affects, and [`Client::invalidate`] is available for
//! anything else:
//!
//! ```no_run
//! # use bitbucket_rest::Client;
//! # async fn example(client: Client) -> Result<(), bitbucket_rest::Error> {
//! client.put_unit::<()>("repositories/acme/widget/issues/5", None).await?;
//! client.invalidate("repositories/acme/widget/issues");
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
mod client;
mod error;
pub mod request;
mod response;
pub mod retry;
pub mod transport;

pub use client::{Client, ClientBuilder, API_URL, WEB_URL};
pub use error::{Error, Result, StatusKind};
pub use response::Response;
pub use retry::RetryBudget;
