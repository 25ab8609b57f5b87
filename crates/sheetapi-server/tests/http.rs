use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value as JsonValue, json};
use sheetapi_common::text_row;
use sheetapi_core::{CollectionRegistrar, RegistrationPolicy};
use sheetapi_server::{AppState, router};
use sheetapi_store::MemoryStore;
use std::sync::Arc;
use tower::ServiceExt;

const ROSTER_URL: &str = "https://docs.google.com/spreadsheets/d/roster/edit#gid=0";

fn store() -> Arc<MemoryStore> {
    Arc::new(
        MemoryStore::new()
            .with_sheet(
                "roster",
                "Sheet1",
                vec![
                    text_row(["name", "age"]),
                    text_row(["Alice", "30"]),
                    text_row(["Bob", "25"]),
                ],
            )
            .with_sheet("roster", "fetch-sheet", vec![text_row(["shadowed"])])
            .with_sheet(
                "archive",
                "Sheet1",
                vec![text_row(["name", "age"]), text_row(["Zed", "52"])],
            ),
    )
}

fn app_with(policy: RegistrationPolicy) -> Router {
    router(AppState::new(
        CollectionRegistrar::with_policy(store(), policy),
        3000,
    ))
}

fn app() -> Router {
    app_with(RegistrationPolicy::Replace)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let mut request = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            request = request.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(request.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn connected() -> Router {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/",
        Some(json!({ "spreadsheetUrl": ROSTER_URL })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    app
}

#[tokio::test]
async fn health_reports_the_port() {
    let (status, body) = send(&app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "msg": "Server running on port 3000" }));
}

#[tokio::test]
async fn connect_returns_id_and_sheets() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/",
        Some(json!({ "spreadsheetUrl": ROSTER_URL })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], "roster");
    assert_eq!(
        body["sheets"][0],
        json!({ "properties": { "sheetId": 0, "title": "Sheet1", "index": 0 } })
    );
    assert_eq!(body["sheets"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn connect_to_missing_spreadsheet_is_not_found() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/",
        Some(json!({ "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/nope/edit" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "msg": "Spreadsheet not found" }));
}

#[tokio::test]
async fn connect_with_bad_locator_fails_generically() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/",
        Some(json!({ "spreadsheetUrl": "not a url" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to retrieve spreadsheet metadata" }));
}

#[tokio::test]
async fn connect_without_url_is_a_bad_request() {
    let (status, body) = send(&app(), Method::POST, "/", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unregistered_title_is_not_found() {
    let (status, body) = send(&app(), Method::GET, "/Sheet1", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Collection not found" }));
}

#[tokio::test]
async fn list_and_get_one() {
    let app = connected().await;

    let (status, body) = send(&app, Method::GET, "/Sheet1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([{ "name": "Alice", "age": "30" }, { "name": "Bob", "age": "25" }])
    );

    let (status, body) = send(&app, Method::GET, "/Sheet1/name/Bob", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "name": "Bob", "age": "25" }));

    let (status, body) = send(&app, Method::GET, "/Sheet1/name/Carol", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Record not found" }));
}

#[tokio::test]
async fn create_returns_201_and_the_append_ack() {
    let app = connected().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/Sheet1",
        Some(json!({ "data": { "name": "Carol", "age": "41" } })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "Record created successfully");
    assert_eq!(body["data"]["updates"]["updatedRange"], "Sheet1!A4:B4");

    let (_, carol) = send(&app, Method::GET, "/Sheet1/age/41", None).await;
    assert_eq!(carol, json!({ "name": "Carol", "age": "41" }));
}

#[tokio::test]
async fn create_with_unknown_field_is_a_bad_request() {
    let app = connected().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/Sheet1",
        Some(json!({ "data": { "email": "c@example.com" } })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("email"));
}

#[tokio::test]
async fn create_with_malformed_json_is_a_bad_request() {
    let app = connected().await;
    let request = Request::builder()
        .method(Method::POST)
        .uri("/Sheet1")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_rewrites_the_row() {
    let app = connected().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/Sheet1/name/Alice",
        Some(json!({ "data": ["Alice", "31"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Record updated successfully");
    assert_eq!(body["data"]["updatedRange"], "Sheet1!A2:B2");

    let (_, alice) = send(&app, Method::GET, "/Sheet1/name/Alice", None).await;
    assert_eq!(alice, json!({ "name": "Alice", "age": "31" }));
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() {
    let app = connected().await;
    let (status, body) = send(
        &app,
        Method::PUT,
        "/Sheet1/name/Carol",
        Some(json!({ "data": ["Carol", "41"] })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "Record not found" }));
}

#[tokio::test]
async fn delete_clears_the_row() {
    let app = connected().await;
    let (status, body) = send(&app, Method::DELETE, "/Sheet1/name/Alice", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["msg"], "Record deleted successfully");
    assert_eq!(body["data"]["clearedRanges"], json!(["Sheet1!A2:B2"]));

    let (_, records) = send(&app, Method::GET, "/Sheet1", None).await;
    assert_eq!(
        records,
        json!([{ "name": null, "age": null }, { "name": "Bob", "age": "25" }])
    );
}

#[tokio::test]
async fn fetch_sheet_reads_without_registration() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/fetch-sheet",
        Some(json!({ "spreadsheetId": "archive", "sheetName": "Sheet1" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "name": "Zed", "age": "52" }]));
}

#[tokio::test]
async fn fetch_sheet_failure_is_generic() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/fetch-sheet",
        Some(json!({ "spreadsheetId": "archive", "sheetName": "Missing" })),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Failed to fetch sheet data" }));
}

#[tokio::test]
async fn static_route_shadows_a_tab_with_the_same_title() {
    let app = connected().await;
    let (status, _) = send(&app, Method::GET, "/fetch-sheet", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn reconnecting_under_replace_serves_the_newest_binding() {
    let app = connected().await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/",
        Some(json!({ "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/archive/edit" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app, Method::GET, "/Sheet1", None).await;
    assert_eq!(body, json!([{ "name": "Zed", "age": "52" }]));
}

#[tokio::test]
async fn reconnecting_under_reject_keeps_the_first_binding() {
    let app = app_with(RegistrationPolicy::Reject);
    let (status, _) = send(
        &app,
        Method::POST,
        "/",
        Some(json!({ "spreadsheetUrl": ROSTER_URL })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        Method::POST,
        "/",
        Some(json!({ "spreadsheetUrl": "https://docs.google.com/spreadsheets/d/archive/edit" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("Sheet1"));

    let (_, body) = send(&app, Method::GET, "/Sheet1", None).await;
    assert_eq!(body.as_array().unwrap().len(), 2);
}
