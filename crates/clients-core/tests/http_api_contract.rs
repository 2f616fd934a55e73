//! Contract Test: HTTP API of the client registry
//!
//! Each table row sends one request and then checks the full registry
//! contents through the listing endpoint.
//!
//! Constraints verified:
//! - Successful requests answer 200 and apply the change
//! - Every rejected request answers 400 and leaves the registry unchanged
//! - Update keeps the client's UID

mod common;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use clients_core::http;
use clients_core::wire::{SearchIdJson, SearchJson};
use clients_core::{ClientJson, ClientRegistry, Error, UpdateJson};
use common::*;

#[tokio::test]
async fn add_client_table() {
    let registry = ClientRegistry::default();

    let client_one = new_client_with_ids("client1", &[TEST_CLIENT_IP1]);
    let client_two = new_client_with_ids("client2", &[TEST_CLIENT_IP2]);

    let cases = [
        ("add_one", ClientJson::from(&client_one), StatusCode::OK, vec![&client_one]),
        (
            "add_two",
            ClientJson::from(&client_two),
            StatusCode::OK,
            vec![&client_one, &client_two],
        ),
        (
            "duplicate_client",
            ClientJson::from(&client_two),
            StatusCode::BAD_REQUEST,
            vec![&client_one, &client_two],
        ),
        (
            "empty_client_id",
            client_json_with_empty_id("empty_client_id"),
            StatusCode::BAD_REQUEST,
            vec![&client_one, &client_two],
        ),
    ];

    for (name, cj, want_code, want_clients) in cases {
        let code = post_add(&registry, &cj).await;
        assert_eq!(code, want_code, "case {name}");
        assert!(clients_compare(&registry, &want_clients).await, "case {name}");
    }
}

#[tokio::test]
async fn delete_client_table() {
    let registry = ClientRegistry::default();

    let client_one = new_client_with_ids("client1", &[TEST_CLIENT_IP1]);
    registry.add(client_one.clone()).await.expect("add succeeds");

    let client_two = new_client_with_ids("client2", &[TEST_CLIENT_IP2]);
    registry.add(client_two.clone()).await.expect("add succeeds");

    assert!(clients_compare(&registry, &[&client_one, &client_two]).await);

    let cases = [
        ("remove_one", ClientJson::from(&client_one), StatusCode::OK, vec![&client_two]),
        (
            "duplicate_client",
            ClientJson::from(&client_one),
            StatusCode::BAD_REQUEST,
            vec![&client_two],
        ),
        (
            "empty_client_name",
            ClientJson::from(&new_client("")),
            StatusCode::BAD_REQUEST,
            vec![&client_two],
        ),
        ("remove_two", ClientJson::from(&client_two), StatusCode::OK, vec![]),
    ];

    for (name, cj, want_code, want_clients) in cases {
        let code = post_delete(&registry, &cj).await;
        assert_eq!(code, want_code, "case {name}");
        assert!(clients_compare(&registry, &want_clients).await, "case {name}");
    }

    assert!(registry.is_empty().await);
}

#[tokio::test]
async fn update_client_table() {
    let registry = ClientRegistry::default();

    let client_one = new_client_with_ids("client1", &[TEST_CLIENT_IP1]);
    let uid = registry.add(client_one.clone()).await.expect("add succeeds").uid;

    assert!(clients_compare(&registry, &[&client_one]).await);

    let client_modified = new_client_with_ids("client2", &[TEST_CLIENT_IP2]);

    let cases = [
        (
            "update_one",
            client_one.name.as_str(),
            ClientJson::from(&client_modified),
            StatusCode::OK,
        ),
        ("empty_name", "", ClientJson::from(&client_one), StatusCode::BAD_REQUEST),
        (
            "client_not_found",
            "client_not_found",
            ClientJson::from(&client_one),
            StatusCode::BAD_REQUEST,
        ),
        (
            "empty_client_id",
            client_modified.name.as_str(),
            client_json_with_empty_id("empty_client_id"),
            StatusCode::BAD_REQUEST,
        ),
        (
            "no_ids",
            client_modified.name.as_str(),
            ClientJson::from(&new_client("no_ids")),
            StatusCode::BAD_REQUEST,
        ),
    ];

    for (name, target, data, want_code) in cases {
        let code = post_update(&registry, target, data).await;
        assert_eq!(code, want_code, "case {name}");
        assert!(clients_compare(&registry, &[&client_modified]).await, "case {name}");
    }

    let stored = registry.find_by_name("client2").await.expect("updated client exists");
    assert_eq!(stored.uid, uid, "update must keep the client's UID");
}

#[tokio::test]
async fn empty_name_is_reported_before_bad_ids() {
    let registry = ClientRegistry::default();
    registry
        .add(new_client_with_ids("client1", &[TEST_CLIENT_IP1]))
        .await
        .expect("add succeeds");

    let data = client_json_with_empty_id("");

    let body = Bytes::from(serde_json::to_vec(&data).expect("encoding succeeds"));
    match http::handle_add_client(State(registry.clone()), body).await {
        Err(http::ApiError(Error::InvalidName(_))) => {}
        other => panic!("add: expected InvalidName, got {other:?}"),
    }

    let uj = UpdateJson {
        name: "client1".to_string(),
        data,
    };
    let body = Bytes::from(serde_json::to_vec(&uj).expect("encoding succeeds"));
    match http::handle_update_client(State(registry.clone()), body).await {
        Err(http::ApiError(Error::InvalidName(_))) => {}
        other => panic!("update: expected InvalidName, got {other:?}"),
    }

    assert_eq!(registry.len().await, 1);
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let registry = ClientRegistry::default();
    registry
        .add(new_client_with_ids("client1", &[TEST_CLIENT_IP1]))
        .await
        .expect("add succeeds");

    let bodies: [&[u8]; 4] = [b"", b"{", b"[]", b"{\"name\": 5}"];
    for body in bodies {
        let code = post_raw_add(&registry, body).await;
        assert_eq!(code, StatusCode::BAD_REQUEST, "body {:?}", String::from_utf8_lossy(body));
    }

    assert_eq!(registry.len().await, 1);
}

async fn post_raw_add(registry: &ClientRegistry, body: &[u8]) -> StatusCode {
    use axum::response::IntoResponse;

    http::handle_add_client(State(registry.clone()), Bytes::copy_from_slice(body))
        .await
        .into_response()
        .status()
}

#[tokio::test]
async fn unsupported_tag_is_rejected() {
    let registry = ClientRegistry::default();

    let mut cj = ClientJson::from(&new_client_with_ids("tv", &["10.0.0.5"]));
    cj.tags = vec!["device_toaster".to_string()];
    assert_eq!(post_add(&registry, &cj).await, StatusCode::BAD_REQUEST);

    cj.tags = vec!["device_tv".to_string()];
    assert_eq!(post_add(&registry, &cj).await, StatusCode::OK);

    let list = http::handle_get_clients(State(registry.clone())).await.0;
    assert_eq!(list.clients[0].tags, ["device_tv"]);
    assert!(list.supported_tags.contains(&"device_tv".to_string()));
}

#[tokio::test]
async fn search_resolves_each_id() {
    let registry = ClientRegistry::default();
    registry
        .add(new_client_with_ids("office", &["10.0.0.0/8"]))
        .await
        .expect("add succeeds");
    registry
        .add(new_client_with_ids("printer", &["172.16.0.9"]))
        .await
        .expect("add succeeds");

    let search = SearchJson {
        clients: ["10.1.2.3", "172.16.0.9", "192.168.0.1", "bogus_id"]
            .into_iter()
            .map(|id| SearchIdJson { id: id.to_string() })
            .collect(),
    };
    let body = Bytes::from(serde_json::to_vec(&search).expect("encoding succeeds"));

    let results = match http::handle_search_clients(State(registry.clone()), body).await {
        Ok(json) => json.0,
        Err(e) => panic!("search failed: {:?}", e),
    };

    assert_eq!(results.len(), 4);
    let name_of = |i: usize, id: &str| results[i][id].as_ref().map(|c| c.name.clone());
    assert_eq!(name_of(0, "10.1.2.3").as_deref(), Some("office"));
    assert_eq!(name_of(1, "172.16.0.9").as_deref(), Some("printer"));
    assert_eq!(name_of(2, "192.168.0.1"), None);
    assert_eq!(name_of(3, "bogus_id"), None);
}
