use super::models::{Events, Followers, RepositoryDetailed};
use super::Issues;
use crate::{Client, Result};

/// One repository, addressed as `owner/slug`.
#[derive(Clone)]
pub struct Repository<'a> {
    client: &'a Client,
    base: String,
}

impl<'a> Repository<'a> {
    pub(crate) fn new(client: &'a Client, owner: String, slug: String) -> Self {
        Self {
            client,
            base: format!("repositories/{}/{}", owner, slug),
        }
    }

    /// The relative path of the repository, also the prefix of all its resources.
    pub fn path(&self) -> &str {
        &self.base
    }

    /// The repository's details.
    pub async fn get(&self) -> Result<RepositoryDetailed> {
        self.client.get(self.base.as_str()).await
    }

    /// The repository's details, fetched past the cache.
    pub async fn refresh(&self) -> Result<RepositoryDetailed> {
        self.client.get_with(self.base.as_str(), true).await
    }

    /// The repository's activity feed.
    pub async fn events(&self) -> Result<Events> {
        self.client.get(format!("{}/events", self.base)).await
    }

    /// Accounts following the repository.
    pub async fn followers(&self) -> Result<Followers> {
        self.client.get(format!("{}/followers", self.base)).await
    }

    /// The repository's issue tracker.
    pub fn issues(&self) -> Issues<'a> {
        Issues::new(self.client, format!("{}/issues", self.base))
    }
}
