//! Example demonstrating error handling.
//!
//! Shows how to:
//! - Tell a missing resource from other HTTP failures
//! - Read the raw body and headers of a failed call
//! - Recognize a call that never reached the server
//! - Deal with a body that doesn't match the expected type
//!
//! Run with: `cargo run --example error_handling`

use bitbucket_rest::{Client, Error, StatusKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Deserialize, Serialize)]
#[allow(dead_code)]
struct Branch {
    name: String,
    revision: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("bitbucket_rest=info")
        .init();

    let client = Client::builder().build()?;

    println!("=== Example 1: Missing repository ===");
    match client.repository("acme", "no-such-repo").get().await {
        Ok(repo) => println!("Unexpectedly found: {}", repo.name),
        Err(e) if e.is_not_found() => println!("Not found, as expected"),
        Err(Error::HttpError {
            status,
            kind,
            raw_response,
            headers,
        }) => {
            println!("HTTP {} ({})", status, kind);
            println!("Content-Type: {:?}", headers.get("content-type"));
            println!("Body: {}", raw_response);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Classifying failures ===");
    match client.get::<serde_json::Value>("user").await {
        Ok(user) => println!("Anonymous access returned: {}", user),
        Err(e) => match e.kind() {
            Some(StatusKind::Unauthorized) | Some(StatusKind::Forbidden) => {
                println!("Credentials required: {}", e)
            }
            Some(kind) if kind.is_server_error() => println!("Bitbucket is having trouble: {}", e),
            Some(kind) => println!("Request rejected ({}): {}", kind, e),
            None => println!("No status at all: {}", e),
        },
    }
    println!();

    println!("=== Example 3: Server unreachable ===");
    let offline = Client::builder()
        .base_url("http://127.0.0.1:1/1.0")?
        .retries(2)
        .timeout(Duration::from_secs(2))
        .build()?;
    match offline.account().repositories().await {
        Ok(_) => println!("Unexpected success"),
        Err(Error::NoConnection {
            attempts,
            last_error,
        }) => {
            println!("Gave up after {} attempts", attempts);
            println!("Last failure: {}", last_error);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 4: Unexpected body shape ===");
    match client.get::<Vec<Branch>>("repositories/atlassian/python-bitbucket").await {
        Ok(branches) => println!("Got {} branches", branches.len()),
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            println!("Status {} but the body didn't fit: {}", status, serde_error);
            let preview: String = raw_response.chars().take(80).collect();
            println!("Body starts with: {}", preview);
        }
        Err(e) => println!("Other error: {}", e),
    }

    Ok(())
}
