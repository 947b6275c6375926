// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Category sync flow against mocked Moodle and Frappe sites.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use moodle_bridge_client::MoodleClient;
use moodle_bridge_frappe::FrappeClient;
use moodle_bridge_sync::categories::sync_category;
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

#[tokio::test]
async fn test_category_sync_with_subcategories_and_course_links() {
    let moodle = MockServer::start().await;
    let frappe = MockServer::start().await;

    // Category 4, parent 2 (not mirrored). Its listed children include the
    // category itself, which must be skipped, and a real child (id 5).
    Mock::given(method("GET"))
        .and(path("/webservice/rest/server.php"))
        .and(query_param("wsfunction", "core_course_get_categories"))
        .and(query_param("criteria[0][key]", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 4, "name": "Técnico", "description": "Cursos técnicos", "parent": 2}
        ])))
        .mount(&moodle)
        .await;
    Mock::given(method("GET"))
        .and(path("/webservice/rest/server.php"))
        .and(query_param("wsfunction", "core_course_get_categories"))
        .and(query_param("criteria[0][key]", "parent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 5, "name": "Electricidad", "description": "", "parent": 4},
            {"id": 4, "name": "Técnico", "description": "", "parent": 4}
        ])))
        .mount(&moodle)
        .await;
    Mock::given(method("GET"))
        .and(path("/webservice/rest/server.php"))
        .and(query_param("wsfunction", "core_course_get_courses_by_field"))
        .and(query_param("field", "category"))
        .and(query_param("value", "4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "courses": [{"id": 9, "fullname": "PRL"}, {"id": 10, "fullname": "Solar"}]
        })))
        .mount(&moodle)
        .await;

    // Frappe: parent lookup finds nothing, category docs don't exist yet,
    // course 9 is mirrored, course 10 is not.
    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20Course%20Category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&frappe)
        .await;
    Mock::given(method("GET"))
        .and(path_regex("^/api/resource/Moodle%20Course%20Category/.+$"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&frappe)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/resource/Moodle%20Course%20Category"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&frappe)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex("^/api/resource/Moodle%20Course%20Category/.+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&frappe)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20Course/Campus%2042%209"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"name": "Campus 42 9"}
        })))
        .mount(&frappe)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/resource/Moodle%20Course/Campus%2042%2010"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&frappe)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/resource/Moodle%20Course/Campus%2042%209"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .expect(1)
        .mount(&frappe)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/resource/Error%20Log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&frappe)
        .await;

    let report = sync_category(
        &frappe_client(&frappe),
        &site(),
        &moodle_client(&moodle),
        4,
    )
    .await;
    assert_eq!(report.status, SyncStatus::Success);
    assert!(report
        .logs
        .iter()
        .any(|line| line.contains("parent category with id 2 is not mirrored")));
    assert!(report
        .logs
        .iter()
        .any(|line| line.contains("cannot be its own parent")));
    assert!(report
        .logs
        .iter()
        .any(|line| line.contains("Course with id 10 is not mirrored")));

    let requests = frappe.received_requests().await.unwrap();

    // The category itself was created without a parent link.
    let category_insert = requests
        .iter()
        .filter(|request| {
            request.method.as_str() == "POST"
                && request.url.path() == "/api/resource/Moodle%20Course%20Category"
        })
        .map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).unwrap())
        .find(|body| body["coursecat_id"] == "4")
        .expect("category insert");
    assert_eq!(category_insert["name"], "Campus 42 4");
    assert_eq!(category_insert["coursecat_parent"], serde_json::Value::Null);

    // The subcategory was linked to the synced category.
    let subcategory_insert = requests
        .iter()
        .filter(|request| {
            request.method.as_str() == "POST"
                && request.url.path() == "/api/resource/Moodle%20Course%20Category"
        })
        .map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).unwrap())
        .find(|body| body["coursecat_id"] == "5")
        .expect("subcategory insert");
    assert_eq!(subcategory_insert["coursecat_parent"], "Campus 42 4");

    // The parent's child table ends up with exactly the real child.
    let table_update = requests
        .iter()
        .filter(|request| {
            request.method.as_str() == "PUT"
                && request.url.path() == "/api/resource/Moodle%20Course%20Category/Campus%2042%204"
        })
        .map(|request| serde_json::from_slice::<serde_json::Value>(&request.body).unwrap())
        .find(|body| body.get("coursecat_subcat").is_some())
        .expect("subcategory table update");
    assert_eq!(
        table_update["coursecat_subcat"],
        json!([{"coursecat_subcat": "Campus 42 5"}])
    );

    // The mirrored course got its category link refreshed.
    let course_patch = requests
        .iter()
        .find(|request| {
            request.method.as_str() == "PUT"
                && request.url.path() == "/api/resource/Moodle%20Course/Campus%2042%209"
        })
        .expect("course category patch");
    let body: serde_json::Value = serde_json::from_slice(&course_patch.body).unwrap();
    assert_eq!(body["course_category"], "Campus 42 4");
}

#[tokio::test]
async fn test_unknown_category_yields_error_report() {
    let moodle = MockServer::start().await;
    let frappe = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/webservice/rest/server.php"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&moodle)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/resource/Error%20Log"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {}})))
        .mount(&frappe)
        .await;

    let report = sync_category(
        &frappe_client(&frappe),
        &site(),
        &moodle_client(&moodle),
        77,
    )
    .await;
    assert_eq!(report.status, SyncStatus::Error);
    assert!(report.message.contains("no category with id 77"));
}
