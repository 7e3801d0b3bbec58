//! Response and payload types for the Bitbucket 1.0 API.
//!
//! Field names follow the API's snake_case JSON. Nearly everything the API
//! returns is optional in practice, so most fields default when absent.

use serde::{Deserialize, Serialize};

/// A Bitbucket user or team.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub resource_uri: Option<String>,
    #[serde(default)]
    pub is_team: bool,
}

/// Response of `GET user`: the authenticated account and its repositories.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountInfo {
    pub user: User,
    #[serde(default)]
    pub repositories: Vec<RepositoryDetailed>,
}

/// A repository as returned by the repository and follow endpoints.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RepositoryDetailed {
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub scm: Option<String>,
    #[serde(default)]
    pub logo: Option<String>,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_fork: bool,
    #[serde(default)]
    pub has_issues: bool,
    #[serde(default)]
    pub has_wiki: bool,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub followers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub utc_created_on: Option<String>,
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub utc_last_updated: Option<String>,
    #[serde(default)]
    pub resource_uri: Option<String>,
}

/// A page of activity events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Events {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// One entry of a user or repository activity feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub node: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub repository: Option<RepositoryDetailed>,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub utc_created_on: Option<String>,
    #[serde(default)]
    pub user: Option<User>,
    pub event: String,
}

impl Event {
    /// A human readable label for well-known event kinds.
    ///
    /// # Examples
    ///
    /// ```
    /// use bitbucket_rest::api::models::Event;
    ///
    /// let event = Event { event: "wiki_created".to_string(), ..Default::default() };
    /// assert_eq!(event.label(), Some("Wiki Created"));
    /// ```
    pub fn label(&self) -> Option<&'static str> {
        match self.event.as_str() {
            "commit" => Some("Commit"),
            "wiki_created" => Some("Wiki Created"),
            "wiki_updated" => Some("Wiki Updated"),
            _ => None,
        }
    }
}

/// Followers of a user or repository.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Followers {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub followers: Vec<User>,
}

/// An email address registered on an account.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Email {
    pub email: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub primary: bool,
}

/// A page of issues.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Issues {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

/// An issue in a repository's tracker.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Issue {
    pub local_id: u64,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub follower_count: u64,
    #[serde(default)]
    pub created_on: Option<String>,
    #[serde(default)]
    pub utc_created_on: Option<String>,
    #[serde(default)]
    pub utc_last_updated: Option<String>,
    #[serde(default)]
    pub resource_uri: Option<String>,
    #[serde(default)]
    pub is_spam: bool,
    #[serde(default)]
    pub reported_by: Option<User>,
    #[serde(default)]
    pub responsible: Option<User>,
    #[serde(default)]
    pub metadata: Option<IssueMetadata>,
}

/// Classification fields of an issue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct IssueMetadata {
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub component: Option<String>,
    #[serde(default)]
    pub milestone: Option<String>,
}

/// Payload for creating or updating an issue.
///
/// Unset fields are left out of the request.
///
/// # Examples
///
/// ```
/// use bitbucket_rest::api::models::CreateIssue;
///
/// let issue = CreateIssue {
///     title: Some("Crash on start".to_string()),
///     kind: Some("bug".to_string()),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreateIssue {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsible: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Comment {
    pub comment_id: u64,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author_info: Option<User>,
    #[serde(default)]
    pub utc_created_on: Option<String>,
    #[serde(default)]
    pub utc_updated_on: Option<String>,
    #[serde(default)]
    pub is_spam: bool,
}

/// An issue tracker component.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Component {
    pub id: u64,
    pub name: String,
}

/// An issue tracker version.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Version {
    pub id: u64,
    pub name: String,
}

/// An issue tracker milestone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_from_api_json() {
        let issue: Issue = serde_json::from_value(json!({
            "status": "new",
            "priority": "major",
            "title": "Crash on start",
            "comment_count": 2,
            "local_id": 5,
            "reported_by": {"username": "alice", "is_team": false},
            "metadata": {"kind": "bug", "version": null, "component": null, "milestone": null},
            "is_spam": false
        }))
        .unwrap();

        assert_eq!(issue.local_id, 5);
        assert_eq!(issue.reported_by.unwrap().username, "alice");
        assert_eq!(issue.metadata.unwrap().kind.as_deref(), Some("bug"));
        assert!(issue.responsible.is_none());
    }

    #[test]
    fn test_unknown_event_has_no_label() {
        let event = Event {
            event: "pushed".to_string(),
            ..Default::default()
        };
        assert_eq!(event.label(), None);
    }
}
