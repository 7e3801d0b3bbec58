//! Resource wrapper tests against a wiremock server.

use bitbucket_rest::api::models::CreateIssue;
use bitbucket_rest::cache::{CacheProvider, MemoryCache};
use bitbucket_rest::{Client, Error, StatusKind};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_string, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn cached_client(mock_server: &MockServer) -> (Client, Arc<MemoryCache>) {
    let cache = Arc::new(MemoryCache::new());
    let client = Client::builder()
        .base_url(format!("{}/1.0", mock_server.uri()))
        .unwrap()
        .credentials("alice", "secret")
        .cache(cache.clone())
        .build()
        .unwrap();
    (client, cache)
}

fn issue_json(id: u64, title: &str) -> serde_json::Value {
    json!({
        "local_id": id,
        "title": title,
        "status": "new",
        "priority": "major",
        "comment_count": 0,
        "is_spam": false,
        "reported_by": {"username": "alice", "is_team": false},
        "metadata": {"kind": "bug"}
    })
}

#[tokio::test]
async fn test_account_followed_repositories() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/user/follows"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Widget", "slug": "widget", "owner": "acme", "scm": "git"},
            {"name": "Gadget", "slug": "gadget", "owner": "acme", "scm": "hg", "is_private": true}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = cached_client(&mock_server).await;
    let repos = client.account().repositories().await.unwrap();

    assert_eq!(repos.len(), 2);
    assert_eq!(repos[0].slug, "widget");
    assert!(repos[1].is_private);

    // Second call is served from the cache
    let again = client.account().repositories().await.unwrap();
    assert_eq!(again, repos);
}

#[tokio::test]
async fn test_account_emails_use_own_name() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/users/alice/emails"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"email": "alice@example.com", "active": true, "primary": true},
            {"email": "old@example.com"}
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = cached_client(&mock_server).await;
    let emails = client.account().emails().await.unwrap();

    assert_eq!(emails.len(), 2);
    assert!(emails[0].primary);
    assert!(!emails[1].active);
}

#[tokio::test]
async fn test_account_emails_without_credentials() {
    let mock_server = MockServer::start().await;

    let client = Client::builder()
        .base_url(format!("{}/1.0", mock_server.uri()))
        .unwrap()
        .build()
        .unwrap();

    let result = client.account().emails().await;

    assert!(matches!(result, Err(Error::InvalidArgument(_))));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_user_profile_and_events() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/users/bob"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": {"username": "bob", "display_name": "Bob B", "is_team": false},
            "repositories": []
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1.0/users/bob/events"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "events": [{"event": "commit", "node": "abc123", "user": {"username": "bob"}}]
        })))
        .mount(&mock_server)
        .await;

    let (client, _) = cached_client(&mock_server).await;
    let bob = client.users("bob").get().await.unwrap();
    let events = client.users("bob").events().await.unwrap();

    assert_eq!(bob.display_name.as_deref(), Some("Bob B"));
    assert_eq!(events.count, 1);
    assert_eq!(events.events[0].label(), Some("Commit"));
}

#[tokio::test]
async fn test_missing_repository() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/repositories/acme/nothing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, cache) = cached_client(&mock_server).await;
    let err = client.repository("acme", "nothing").get().await.unwrap_err();

    assert_eq!(err.kind(), Some(StatusKind::NotFound));
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_creating_issue_invalidates_tracker() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/repositories/acme/widget/issues"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 1,
            "issues": [issue_json(1, "Old")]
        })))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1.0/repositories/acme/widget"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"name": "Widget", "slug": "widget"})),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/1.0/repositories/acme/widget/issues"))
        .and(body_string_contains("title=Crash"))
        .and(body_string_contains("kind=bug"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(2, "Crash")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, cache) = cached_client(&mock_server).await;
    let repository = client.repository("acme", "widget");
    let issues = repository.issues();

    let _ = repository.get().await.unwrap();
    let before = issues.all().await.unwrap();
    assert_eq!(before.count, 1);
    assert!(cache.get("repositories/acme/widget/issues").is_some());

    let created = issues
        .create(&CreateIssue {
            title: Some("Crash".to_string()),
            kind: Some("bug".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(created.local_id, 2);

    // The tracker was dropped from the cache, the repository itself was not
    assert!(cache.get("repositories/acme/widget/issues").is_none());
    assert!(cache.get("repositories/acme/widget").is_some());

    let _ = issues.all().await.unwrap();
    let _ = repository.get().await.unwrap();
}

#[tokio::test]
async fn test_failed_mutation_keeps_cache() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/repositories/acme/widget/issues/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(3, "Flaky")))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/1.0/repositories/acme/widget/issues/3"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, cache) = cached_client(&mock_server).await;
    let issues = client.repository("acme", "widget").issues();

    let _ = issues.get(3).await.unwrap();
    let err = issues.delete(3).await.unwrap_err();

    assert_eq!(err.kind(), Some(StatusKind::Forbidden));
    assert!(cache.get("repositories/acme/widget/issues/3").is_some());
}

#[tokio::test]
async fn test_issue_comment_and_delete() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/1.0/repositories/acme/widget/issues/5/comments"))
        .and(body_string("content=reproduced"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "comment_id": 77,
            "content": "reproduced",
            "author_info": {"username": "alice"}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/1.0/repositories/acme/widget/issues/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = cached_client(&mock_server).await;
    let issues = client.repository("acme", "widget").issues();

    let comment = issues.add_comment(5, "reproduced").await.unwrap();
    assert_eq!(comment.comment_id, 77);

    issues.delete(5).await.unwrap();
}

#[tokio::test]
async fn test_update_issue_sends_only_set_fields() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/1.0/repositories/acme/widget/issues/5"))
        .and(body_string("status=resolved"))
        .respond_with(ResponseTemplate::new(200).set_body_json(issue_json(5, "Crash")))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (client, _) = cached_client(&mock_server).await;
    let updated = client
        .repository("acme", "widget")
        .issues()
        .update(
            5,
            &CreateIssue {
                status: Some("resolved".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.local_id, 5);
}

#[tokio::test]
async fn test_tracker_metadata_lists() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/1.0/repositories/acme/widget/issues/components"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1, "name": "core"}])),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/1.0/repositories/acme/widget/issues/milestones"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let (client, _) = cached_client(&mock_server).await;
    let issues = client.repository("acme", "widget").issues();

    let components = issues.components().await.unwrap();
    let milestones = issues.milestones().await.unwrap();

    assert_eq!(components[0].name, "core");
    assert!(milestones.is_empty());
}
