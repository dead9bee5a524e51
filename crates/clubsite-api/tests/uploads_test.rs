//! Upload API integration tests, local storage mode.
//!
//! Run with: `cargo test -p clubsite-api --test uploads_test`

mod helpers;

use axum::http::StatusCode;
use axum_test::multipart::{MultipartForm, Part};
use helpers::{setup_test_app, setup_test_app_with};
use serde_json::Value;

fn pdf_form(bytes: &'static [u8]) -> MultipartForm {
    let part = Part::bytes(bytes::Bytes::from_static(bytes))
        .file_name("test.pdf")
        .mime_type("application/pdf");
    MultipartForm::new().add_part("file", part)
}

#[tokio::test]
async fn test_upload_resolve_serve_delete_round_trip() {
    let app = setup_test_app().await;
    let client = app.client();

    let upload_response = client
        .post("/api/uploads")
        .add_query_param("folder", "documents")
        .multipart(pdf_form(b"%PDF"))
        .await;
    assert_eq!(upload_response.status_code(), StatusCode::CREATED);

    let body: Value = upload_response.json();
    let reference = body["reference"].as_str().unwrap().to_string();
    let filename = body["filename"].as_str().unwrap();
    assert!(reference.starts_with("/uploads/documents/"));
    assert!(reference.ends_with(".pdf"));
    assert!(reference.ends_with(filename));
    // Local references are already servable
    assert_eq!(body["url"], Value::String(reference.clone()));

    let resolve_response = client
        .get("/api/uploads/resolve")
        .add_query_param("reference", &reference)
        .await;
    assert_eq!(resolve_response.status_code(), StatusCode::OK);
    let resolved: Value = resolve_response.json();
    assert_eq!(resolved["url"], Value::String(reference.clone()));

    let file_response = client.get(&reference).await;
    assert_eq!(file_response.status_code(), StatusCode::OK);
    assert_eq!(&file_response.as_bytes()[..], b"%PDF");

    let on_disk = app
        .uploads_dir()
        .join(reference.trim_start_matches("/uploads/"));
    assert!(on_disk.exists());

    let delete_response = client
        .delete("/api/uploads")
        .add_query_param("reference", &reference)
        .await;
    assert_eq!(delete_response.status_code(), StatusCode::NO_CONTENT);
    assert!(!on_disk.exists());

    let gone_response = client.get(&reference).await;
    assert_eq!(gone_response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_without_folder_uses_default() {
    let app = setup_test_app().await;

    let response = app.client().post("/api/uploads").multipart(pdf_form(b"x")).await;
    assert_eq!(response.status_code(), StatusCode::CREATED);

    let body: Value = response.json();
    assert!(body["reference"]
        .as_str()
        .unwrap()
        .starts_with("/uploads/uploads/"));
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let app = setup_test_app().await;

    let form = MultipartForm::new().add_text("title", "Board meeting minutes");
    let response = app
        .client()
        .post("/api/uploads")
        .add_query_param("folder", "documents")
        .multipart(form)
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn test_upload_over_size_cap_is_rejected() {
    let app = setup_test_app_with(|config| config.0.max_upload_size_bytes = 1024).await;

    let part = Part::bytes(bytes::Bytes::from(vec![0u8; 2048]))
        .file_name("flyer.png")
        .mime_type("image/png");
    let response = app
        .client()
        .post("/api/uploads")
        .add_query_param("folder", "tournaments")
        .multipart(MultipartForm::new().add_part("file", part))
        .await;

    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
    assert!(!app.uploads_dir().join("tournaments").exists());
}

#[tokio::test]
async fn test_upload_into_escaping_folder_is_rejected() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post("/api/uploads")
        .add_query_param("folder", "../outside")
        .multipart(pdf_form(b"x"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(body["error_type"], "InvalidInput");
    assert!(body["details"].as_str().unwrap().contains("../outside"));
}

#[tokio::test]
async fn test_production_errors_omit_details() {
    let app = setup_test_app_with(|config| {
        config.0.base.environment = "production".to_string();
        config.0.base.cors_origins = vec!["https://club.example".to_string()];
    })
    .await;

    let response = app
        .client()
        .post("/api/uploads")
        .add_query_param("folder", "../outside")
        .multipart(pdf_form(b"x"))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body.get("details").is_none());
    assert!(body.get("error_type").is_none());
}

#[tokio::test]
async fn test_resolve_passes_external_and_empty_references_through() {
    let app = setup_test_app().await;
    let client = app.client();

    let external: Value = client
        .get("/api/uploads/resolve")
        .add_query_param("reference", "https://example.com/x.jpg")
        .await
        .json();
    assert_eq!(external["url"], "https://example.com/x.jpg");

    let missing: Value = client.get("/api/uploads/resolve").await.json();
    assert_eq!(missing["url"], "");
}

#[tokio::test]
async fn test_delete_unknown_references_still_succeeds() {
    let app = setup_test_app().await;
    let client = app.client();

    for reference in [
        "/uploads/documents/0-0.pdf",
        "gallery/abc/1-2.png",
        "https://example.com/x.jpg",
        "",
    ] {
        let response = client
            .delete("/api/uploads")
            .add_query_param("reference", reference)
            .await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    }

    let response = client.delete("/api/uploads").await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    assert_eq!(app.state.storage_events.delete_failures(), 0);
}

#[tokio::test]
async fn test_health_reports_backend_and_counters() {
    let app = setup_test_app().await;

    let response = app.client().get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["storage_backend"], "local");
    assert_eq!(body["sign_fallbacks"], 0);
    assert_eq!(body["delete_failures"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_health_counts_refused_deletes() {
    let app = setup_test_app().await;

    app.client()
        .delete("/api/uploads")
        .add_query_param("reference", "/uploads/../secret.txt")
        .await;

    let body: Value = app.client().get("/health").await.json();
    assert_eq!(body["delete_failures"], 1);
}
