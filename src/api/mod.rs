//! Typed resource wrappers over the [`Client`].
//!
//! Each wrapper borrows the client, fills in a fixed path template and hands
//! the call to the client unchanged. Errors propagate as they are.
//!
//! - [`Account`]: the authenticated account (`user/...`)
//! - [`Users`]: any user by name (`users/{name}/...`)
//! - [`Repository`]: one repository (`repositories/{owner}/{slug}/...`)
//! - [`Issues`]: a repository's issue tracker
//!
//! ```no_run
//! use bitbucket_rest::{api::models::CreateIssue, Client};
//!
//! # async fn example() -> Result<(), bitbucket_rest::Error> {
//! let client = Client::new("alice", "app-password")?;
//!
//! for repo in client.account().repositories().await? {
//!     println!("following {}", repo.slug);
//! }
//!
//! let issues = client.repository("acme", "widget").issues();
//! let created = issues
//!     .create(&CreateIssue {
//!         title: Some("Crash on start".to_string()),
//!         ..Default::default()
//!     })
//!     .await?;
//! println!("opened #{}", created.local_id);
//! # Ok(())
//! # }
//! ```

mod account;
mod issues;
pub mod models;
mod repositories;
mod users;

pub use account::Account;
pub use issues::Issues;
pub use repositories::Repository;
pub use users::Users;

use crate::Client;

impl Client {
    /// Operations on the authenticated account.
    pub fn account(&self) -> Account<'_> {
        Account::new(self)
    }

    /// Operations on the user named `username`.
    pub fn users(&self, username: impl Into<String>) -> Users<'_> {
        Users::new(self, username.into())
    }

    /// Operations on the repository `owner/slug`.
    pub fn repository(&self, owner: impl Into<String>, slug: impl Into<String>) -> Repository<'_> {
        Repository::new(self, owner.into(), slug.into())
    }
}
