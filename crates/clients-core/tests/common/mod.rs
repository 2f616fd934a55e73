//! Test helpers shared by the contract tests
//!
//! Requests go through the real handlers; state is inspected through the
//! listing handler, the way an API client would see it.

#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use clients_core::http;
use clients_core::{ClientJson, ClientRegistry, PersistentClient, UpdateJson};
use std::collections::HashMap;

pub const TEST_CLIENT_IP1: &str = "1.1.1.1";
pub const TEST_CLIENT_IP2: &str = "2.2.2.2";

/// A client with the given name, no identifiers and a fresh UID
pub fn new_client(name: &str) -> PersistentClient {
    PersistentClient::new(name)
}

/// A client with the given name and identifiers
pub fn new_client_with_ids(name: &str, ids: &[&str]) -> PersistentClient {
    PersistentClient::new(name)
        .with_ids(ids)
        .expect("test identifiers are valid")
}

/// Wire form of a client whose identifier list is `[""]`
pub fn client_json_with_empty_id(name: &str) -> ClientJson {
    ClientJson {
        name: name.to_string(),
        ids: vec![String::new()],
        ..ClientJson::default()
    }
}

fn body_of<T: serde::Serialize>(value: &T) -> Bytes {
    Bytes::from(serde_json::to_vec(value).expect("encoding succeeds"))
}

pub async fn post_add(registry: &ClientRegistry, cj: &ClientJson) -> StatusCode {
    http::handle_add_client(State(registry.clone()), body_of(cj))
        .await
        .into_response()
        .status()
}

pub async fn post_delete(registry: &ClientRegistry, cj: &ClientJson) -> StatusCode {
    http::handle_del_client(State(registry.clone()), body_of(cj))
        .await
        .into_response()
        .status()
}

pub async fn post_update(registry: &ClientRegistry, name: &str, data: ClientJson) -> StatusCode {
    let uj = UpdateJson {
        name: name.to_string(),
        data,
    };
    http::handle_update_client(State(registry.clone()), body_of(&uj))
        .await
        .into_response()
        .status()
}

/// Check through the listing handler that the registry holds exactly `want`
///
/// Clients are matched by name and compared by identifier set.
pub async fn clients_compare(registry: &ClientRegistry, want: &[&PersistentClient]) -> bool {
    let list = http::handle_get_clients(State(registry.clone())).await.0;

    let mut got = HashMap::new();
    for cj in list.clients {
        let client = cj.into_client().expect("listed clients decode");
        got.insert(client.name.clone(), client);
    }

    if got.len() != want.len() {
        return false;
    }

    want.iter()
        .all(|c| got.get(&c.name).is_some_and(|g| g.equal_ids(c)))
}
