use super::models::{Comment, Component, CreateIssue, Issue, Issues as IssuePage, Milestone, Version};
use crate::{Client, Result};

/// A repository's issue tracker.
///
/// Reads are cached under their paths. Every successful mutation drops all
/// cached entries under the tracker's path, so the next list or detail read
/// goes back to the server.
#[derive(Clone)]
pub struct Issues<'a> {
    client: &'a Client,
    base: String,
}

impl<'a> Issues<'a> {
    pub(crate) fn new(client: &'a Client, base: String) -> Self {
        Self { client, base }
    }

    /// The tracker path, e.g. `repositories/acme/widget/issues`.
    pub fn path(&self) -> &str {
        &self.base
    }

    fn issue_path(&self, id: u64) -> String {
        format!("{}/{}", self.base, id)
    }

    /// Lists the tracker's issues.
    pub async fn all(&self) -> Result<IssuePage> {
        self.client.get(self.base.as_str()).await
    }

    /// Lists the tracker's issues, fetched past the cache.
    pub async fn refresh(&self) -> Result<IssuePage> {
        self.client.get_with(self.base.as_str(), true).await
    }

    /// A single issue by its number.
    pub async fn get(&self, id: u64) -> Result<Issue> {
        self.client.get(self.issue_path(id)).await
    }

    /// Opens a new issue.
    pub async fn create(&self, issue: &CreateIssue) -> Result<Issue> {
        let created: Issue = self.client.post(self.base.as_str(), issue).await?;
        self.client.invalidate(&self.base);
        Ok(created)
    }

    /// Changes the fields set in `issue`.
    pub async fn update(&self, id: u64, issue: &CreateIssue) -> Result<Issue> {
        let updated: Issue = self
            .client
            .put(self.issue_path(id), Some(issue))
            .await?;
        self.client.invalidate(&self.base);
        Ok(updated)
    }

    /// Deletes an issue.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.client.delete(self.issue_path(id)).await?;
        self.client.invalidate(&self.base);
        Ok(())
    }

    /// Comments on an issue.
    pub async fn comments(&self, id: u64) -> Result<Vec<Comment>> {
        self.client
            .get(format!("{}/comments", self.issue_path(id)))
            .await
    }

    /// Adds a comment to an issue.
    pub async fn add_comment(&self, id: u64, content: impl Into<String>) -> Result<Comment> {
        let comment: Comment = self
            .client
            .post_params(
                format!("{}/comments", self.issue_path(id)),
                vec![("content".to_string(), content.into())],
            )
            .await?;
        self.client.invalidate(&self.base);
        Ok(comment)
    }

    /// Components issues can be filed under.
    pub async fn components(&self) -> Result<Vec<Component>> {
        self.client.get(format!("{}/components", self.base)).await
    }

    /// Versions issues can be filed against.
    pub async fn versions(&self) -> Result<Vec<Version>> {
        self.client.get(format!("{}/versions", self.base)).await
    }

    /// Milestones issues can be scheduled for.
    pub async fn milestones(&self) -> Result<Vec<Milestone>> {
        self.client.get(format!("{}/milestones", self.base)).await
    }
}
