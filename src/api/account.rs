use super::models::{AccountInfo, Email, RepositoryDetailed};
use crate::{Client, Error, Result};

/// The account the client is authenticated as.
#[derive(Clone, Copy)]
pub struct Account<'a> {
    client: &'a Client,
}

impl<'a> Account<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// The account's profile and repositories.
    pub async fn get(&self) -> Result<AccountInfo> {
        self.client.get("user").await
    }

    /// Repositories the account follows.
    pub async fn repositories(&self) -> Result<Vec<RepositoryDetailed>> {
        self.client.get("user/follows").await
    }

    /// Repositories the account owns or has access to.
    pub async fn owned_repositories(&self) -> Result<Vec<RepositoryDetailed>> {
        self.client.get("user/repositories").await
    }

    /// Email addresses registered on the account.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] when the client has no credentials,
    /// since the path needs the account name.
    pub async fn emails(&self) -> Result<Vec<Email>> {
        let username = self.client.username().ok_or_else(|| {
            Error::InvalidArgument("emails need a client with credentials".to_string())
        })?;
        self.client.get(format!("users/{}/emails", username)).await
    }
}
