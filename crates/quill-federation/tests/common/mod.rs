//! Shared fixtures for the hub integration tests.

#![allow(dead_code)]

use quill_core::{Account, AccountMetadata, Hash, Item, OAuthToken};
use quill_federation::{Endpoints, FederatedClient, Repository};
use serde_json::{Value, json};
use wiremock::MockServer;

pub const TOKEN: &str = "t0k3n";

/// A repository whose hub API lives at the mock server's root.
pub fn repository(server: &MockServer) -> Repository {
    let client = FederatedClient::new("quill-test/1.0", None).unwrap();
    Repository::new(client, Endpoints::new(&server.uri(), "https://quill.example"))
}

/// A logged-in local account holding an access token.
pub fn alice() -> Account {
    Account {
        hash: Hash::from("a11ce000"),
        handle: "alice".into(),
        metadata: Some(AccountMetadata {
            oauth: Some(OAuthToken {
                access_token: TOKEN.into(),
                refresh_token: String::new(),
            }),
            ..AccountMetadata::default()
        }),
        ..Account::default()
    }
}

pub fn item(hash: &str) -> Item {
    Item {
        hash: Hash::from(hash),
        ..Item::default()
    }
}

pub fn actor_iri(server: &MockServer, hash: &str) -> String {
    format!("{}/actors/{hash}", server.uri())
}

pub fn object_iri(server: &MockServer, hash: &str) -> String {
    format!("{}/objects/{hash}", server.uri())
}

pub fn activity_iri(server: &MockServer, n: u32) -> String {
    format!("{}/activities/{n}", server.uri())
}

pub fn collection(items: Vec<Value>) -> Value {
    json!({
        "type": "OrderedCollection",
        "totalItems": items.len(),
        "orderedItems": items,
    })
}

pub fn activity(kind: &str, id: &str, actor: &str, object: impl Into<Value>) -> Value {
    json!({
        "id": id,
        "type": kind,
        "actor": actor,
        "object": object.into(),
        "published": "2024-05-01T10:00:00Z",
    })
}

pub fn note(id: &str, author: &str, content: &str) -> Value {
    json!({
        "id": id,
        "type": "Note",
        "attributedTo": author,
        "content": content,
        "mediaType": "text/html",
        "published": "2024-05-01T10:00:00Z",
    })
}

pub fn person(id: &str, handle: &str) -> Value {
    json!({
        "id": id,
        "type": "Person",
        "preferredUsername": handle,
        "name": handle,
        "inbox": format!("{id}/inbox"),
        "outbox": format!("{id}/outbox"),
    })
}

/// Bodies of the POST requests the server received, in order.
pub async fn posted_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.method.as_str() == "POST")
        .map(|r| serde_json::from_slice(&r.body).unwrap())
        .collect()
}
