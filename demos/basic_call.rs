//! Basic example: reading the authenticated account and a repository.
//!
//! Shows how to build a client with credentials and a memory cache, call the
//! resource wrappers, and see a repeated read come back from the cache.
//!
//! Run with: `BITBUCKET_USER=alice BITBUCKET_PASSWORD=app-password cargo run --example basic_call`

use bitbucket_rest::{cache::MemoryCache, Client, Error};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter("bitbucket_rest=debug,basic_call=info")
        .init();

    let username = std::env::var("BITBUCKET_USER").unwrap_or_else(|_| "alice".to_string());
    let password = std::env::var("BITBUCKET_PASSWORD").unwrap_or_default();

    let client = Client::builder()
        .credentials(username, password)
        .timeout(Duration::from_secs(30))
        .retries(2)
        .cache(Arc::new(MemoryCache::new()))
        .build()?;

    println!("=== Account ===");
    let account = client.account().get().await?;
    println!("Logged in as: {}", account.user.username);
    println!("Repositories: {}", account.repositories.len());
    for email in client.account().emails().await? {
        println!("Email: {} (primary: {})", email.email, email.primary);
    }
    println!();

    println!("=== Followed repositories ===");
    let followed = client.account().repositories().await?;
    for repo in &followed {
        println!("{}/{}", repo.owner.as_deref().unwrap_or("?"), repo.slug);
    }

    // Same path again, answered from the cache without a request
    let again = client.account().repositories().await?;
    assert_eq!(again.len(), followed.len());
    println!();

    if let Some(first) = followed.first() {
        let owner = first.owner.clone().unwrap_or_default();
        let repository = client.repository(owner, first.slug.clone());

        println!("=== Open issues in {} ===", repository.path());
        let issues = repository.issues().all().await?;
        for issue in issues.issues {
            let status = issue.status.as_deref().unwrap_or("unknown");
            println!("#{} [{}] {}", issue.local_id, status, issue.title);
        }
    }

    Ok(())
}
