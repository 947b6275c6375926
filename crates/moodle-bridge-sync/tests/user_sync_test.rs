// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! User sync flow against mocked Moodle and Frappe sites.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use moodle_bridge_client::MoodleClient;
use moodle_bridge_frappe::FrappeClient;
use moodle_bridge_sync::users::sync_user;
use moodle_bridge_sync::{SiteContext, SyncStatus};

fn site() -> SiteContext {
    SiteContext {
        instance: "Campus 42".to_string(),
        site_url: "campus.example.org".to_string(),
        token: "tok".to_string(),
    }
}

fn moodle_client(server: &MockServer) -> MoodleClient {
    MoodleClient::new(
        format!("{}/webservice/rest/server.php", server.uri()),
        "tok",
        Duration::from_secs(5),
    )
    .unwrap()
}

fn frappe_client(server: &MockServer) -> FrappeClient {
    FrappeClient::new(server.uri(), "key", "secret", Duration::from_secs(5)).unwrap()
}

async fn mock_moodle_user(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/webservice/rest/server.php"))
        .and(query_param("wsfunction", "core_user_get_users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [{
                "id": 7,
                "username": "48112233K",
                "firstname": "Eva",
                "lastname": "Ruiz",
                "email": "eva@example.org",
                "phone1": "600111222"
            }]
        })))
        .mount(server)
        .await;
}

async fn mock_error_log(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/resource/Error%20Log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_new_user_is_created_with_defaults() {
    let moodle = MockServer::start().await;
    let frappe = MockServer::start().await;

    mock_moodle_user(&moodle).await;
    mock_error_log(&frappe).await;

    // Neither the named document nor a user_id match exists.
    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20User/Campus%2042%207"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&frappe)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20User"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&frappe)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/resource/Moodle%20User"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "Campus 42 7"}
        })))
        .expect(1)
        .mount(&frappe)
        .await;

    let report = sync_user(
        &frappe_client(&frappe),
        &site(),
        &moodle_client(&moodle),
        7,
    )
    .await;
    assert_eq!(report.status, SyncStatus::Success);

    // Creation sets the defaults a fresh mirror document needs.
    let requests = frappe.received_requests().await.unwrap();
    let insert = requests
        .iter()
        .find(|request| {
            request.method.as_str() == "POST"
                && request.url.path() == "/api/resource/Moodle%20User"
        })
        .expect("user insert request");
    let body: serde_json::Value = serde_json::from_slice(&insert.body).unwrap();
    assert_eq!(body["name"], "Campus 42 7");
    assert_eq!(body["user_id"], 7);
    assert_eq!(body["moodle_user_id"], "48112233K");
    assert_eq!(body["user_fullname"], "Eva Ruiz");
    assert_eq!(body["user_type"], "Student");
    assert_eq!(body["user_connection_status"], "Disconnected");
}

#[tokio::test]
async fn test_existing_user_update_preserves_user_type() {
    let moodle = MockServer::start().await;
    let frappe = MockServer::start().await;

    mock_moodle_user(&moodle).await;
    mock_error_log(&frappe).await;

    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20User/Campus%2042%207"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "Campus 42 7", "user_type": "Teacher"}
        })))
        .mount(&frappe)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/resource/Moodle%20User/Campus%2042%207"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "Campus 42 7"}
        })))
        .expect(1)
        .mount(&frappe)
        .await;

    let report = sync_user(
        &frappe_client(&frappe),
        &site(),
        &moodle_client(&moodle),
        7,
    )
    .await;
    assert_eq!(report.status, SyncStatus::Success);

    let requests = frappe.received_requests().await.unwrap();
    let update = requests
        .iter()
        .find(|request| request.method.as_str() == "PUT")
        .expect("user update request");
    let body: serde_json::Value = serde_json::from_slice(&update.body).unwrap();
    // Profile updates never demote or promote the stored role, and never
    // reset the connection state.
    assert!(body.get("user_type").is_none());
    assert!(body.get("user_connection_status").is_none());
    assert_eq!(body["user_email"], "eva@example.org");
}

#[tokio::test]
async fn test_legacy_identifier_is_updated_in_place() {
    let moodle = MockServer::start().await;
    let frappe = MockServer::start().await;

    mock_moodle_user(&moodle).await;
    mock_error_log(&frappe).await;

    // No document under the current name, but a user_id filter match exists
    // (written under the old username-based identifier format).
    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20User/Campus%2042%207"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&frappe)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20User"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"name": "Campus 42 48112233K"}]
        })))
        .mount(&frappe)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/resource/Moodle%20User/Campus%2042%2048112233K"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "Campus 42 48112233K"}
        })))
        .expect(1)
        .mount(&frappe)
        .await;

    let report = sync_user(
        &frappe_client(&frappe),
        &site(),
        &moodle_client(&moodle),
        7,
    )
    .await;
    assert_eq!(report.status, SyncStatus::Success);
}

#[tokio::test]
async fn test_missing_moodle_user_yields_error_report() {
    let moodle = MockServer::start().await;
    let frappe = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/webservice/rest/server.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"users": []})))
        .mount(&moodle)
        .await;
    mock_error_log(&frappe).await;

    let report = sync_user(
        &frappe_client(&frappe),
        &site(),
        &moodle_client(&moodle),
        99,
    )
    .await;
    assert_eq!(report.status, SyncStatus::Error);
    assert!(report.message.contains("no user with id 99"));
    assert!(report.logs.iter().any(|line| line.starts_with("[ERROR]")));
}
