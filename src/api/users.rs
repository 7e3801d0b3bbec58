use super::models::{Email, Events, Followers, User};
use crate::{Client, Result};

/// A user, addressed by name.
#[derive(Clone)]
pub struct Users<'a> {
    client: &'a Client,
    username: String,
}

/// Response envelope of `GET users/{name}`.
#[derive(serde::Serialize, serde::Deserialize)]
struct UserEnvelope {
    user: User,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a Client, username: String) -> Self {
        Self { client, username }
    }

    fn path(&self, rest: &str) -> String {
        format!("users/{}{}", self.username, rest)
    }

    /// The user's profile.
    pub async fn get(&self) -> Result<User> {
        let envelope: UserEnvelope = self.client.get(self.path("")).await?;
        Ok(envelope.user)
    }

    /// The user's activity feed.
    pub async fn events(&self) -> Result<Events> {
        self.client.get(self.path("/events")).await
    }

    /// Accounts following the user.
    pub async fn followers(&self) -> Result<Followers> {
        self.client.get(self.path("/followers")).await
    }

    /// Email addresses on the account. Only readable for the authenticated user.
    pub async fn emails(&self) -> Result<Vec<Email>> {
        self.client.get(self.path("/emails")).await
    }
}
