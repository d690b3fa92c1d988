//! Router tests driven through `tower::ServiceExt::oneshot`

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use quire_common::{DocumentRecord, DocumentSummary, ErrorBody, SectionRecord, SubsectionRecord};
use quire_server::{router, AppState, Database};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app() -> Router {
    router(AppState::new(Database::open_in_memory().unwrap()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

async fn create_document(app: &Router, title: &str) -> DocumentSummary {
    let (status, body) = send(app, "POST", "/api/documents", Some(json!({ "title": title }))).await;
    assert_eq!(status, StatusCode::CREATED);
    decode(&body)
}

async fn create_section(app: &Router, document_id: &str, title: &str) -> SectionRecord {
    let (status, body) = send(
        app,
        "POST",
        "/api/sections",
        Some(json!({ "documentId": document_id, "title": title })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    decode(&body)
}

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_document_crud() {
    let app = app();
    let doc = create_document(&app, "Thesis").await;

    let (status, body) = send(&app, "GET", "/api/documents", None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<DocumentSummary> = decode(&body);
    assert_eq!(listed, vec![doc.clone()]);

    let uri = format!("/api/documents/{}", doc.id);
    let (status, body) = send(&app, "PATCH", &uri, Some(json!({ "title": "Dissertation" }))).await;
    assert_eq!(status, StatusCode::OK);
    let updated: DocumentRecord = decode(&body);
    assert_eq!(updated.title, "Dissertation");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorBody = decode(&body);
    assert!(error.error.contains("not found"));
}

#[tokio::test]
async fn test_missing_title_is_bad_request() {
    let app = app();

    let (status, body) = send(&app, "POST", "/api/documents", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorBody = decode(&body);
    assert_eq!(error.error, "title is required");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/documents")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_section_for_unknown_document_is_not_found() {
    let (status, _) = send(
        &app(),
        "POST",
        "/api/sections",
        Some(json!({ "documentId": "missing", "title": "Intro" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_section_patch_is_not_found() {
    let (status, _) = send(
        &app(),
        "PATCH",
        "/api/sections/missing",
        Some(json!({ "title": "Nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_subsection_lifecycle() {
    let app = app();
    let doc = create_document(&app, "Notes").await;
    let section = create_section(&app, &doc.id, "Week 1").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/subsections",
        Some(json!({ "sectionId": section.id, "title": "Monday" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let sub: SubsectionRecord = decode(&body);
    assert_eq!(sub.content, "");
    assert_eq!(sub.order, 0);

    let uri = format!("/api/subsections/{}", sub.id);
    let (status, body) = send(
        &app,
        "PATCH",
        &uri,
        Some(json!({ "content": "<p>rain</p>" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let updated: SubsectionRecord = decode(&body);
    assert_eq!(updated.title, "Monday");
    assert_eq!(updated.content, "<p>rain</p>");

    let (status, body) = send(&app, "GET", &format!("/api/sections/{}", section.id), None).await;
    assert_eq!(status, StatusCode::OK);
    let with_children: SectionRecord = decode(&body);
    assert_eq!(with_children.subsections, vec![updated]);

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_section_delete_cascades() {
    let app = app();
    let doc = create_document(&app, "Notes").await;
    let section = create_section(&app, &doc.id, "Week 1").await;
    let (_, body) = send(
        &app,
        "POST",
        "/api/subsections",
        Some(json!({ "sectionId": section.id, "title": "Monday" })),
    )
    .await;
    let sub: SubsectionRecord = decode(&body);

    let (status, _) = send(&app, "DELETE", &format!("/api/sections/{}", section.id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/api/subsections/{}", sub.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_document_patch_imports_sections() {
    let app = app();
    let doc = create_document(&app, "Imported").await;

    let (status, body) = send(
        &app,
        "PATCH",
        &format!("/api/documents/{}", doc.id),
        Some(json!({
            "sections": [
                { "title": "One", "subsections": [{ "title": "1.1", "content": "<p>a</p>" }] },
                { "title": "Two" }
            ]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let tree: DocumentRecord = decode(&body);
    assert_eq!(tree.title, "Imported");
    assert_eq!(tree.sections.len(), 2);
    assert_eq!(tree.sections[0].subsections[0].content, "<p>a</p>");
    assert!(tree.sections[1].subsections.is_empty());
}

#[tokio::test]
async fn test_negative_order_is_bad_request() {
    let app = app();
    let doc = create_document(&app, "Notes").await;
    let section = create_section(&app, &doc.id, "Week 1").await;

    let (status, _) = send(
        &app,
        "PATCH",
        &format!("/api/sections/{}", section.id),
        Some(json!({ "order": -1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
