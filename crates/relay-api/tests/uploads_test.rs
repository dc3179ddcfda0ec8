//! Upload API integration tests against a mock platform client.
//!
//! Run with: `cargo test -p relay-api --test uploads_test`

mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum_test::multipart::{MultipartForm, Part};
use helpers::fixtures::{create_minimal_png, create_oversize_blob};
use helpers::platform::{MockPlatform, StatusScript, DELIVERY_URL};
use helpers::setup_test_app;
use serde_json::Value;

fn image_form(data: Vec<u8>) -> MultipartForm {
    MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(data).file_name("photo.png").mime_type("image/png"),
        )
        .add_text("fileType", "image/png")
}

#[tokio::test]
async fn upload_completes_without_polling_when_create_returns_url() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;

    let response = app
        .client()
        .post("/api/upload-file")
        .multipart(image_form(create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["url"], DELIVERY_URL);

    assert_eq!(app.platform.staged_count(), 1);
    assert_eq!(app.platform.blob_count(), 1);
    assert_eq!(app.platform.create_count(), 1);
    // A synchronous URL from fileCreate means no readiness polling at all.
    assert_eq!(app.platform.status_count(), 0);
}

#[tokio::test]
async fn upload_polls_until_ready() {
    let app = setup_test_app(Arc::new(MockPlatform::ready_after(3))).await;

    let response = app
        .client()
        .post("/api/upload-file")
        .multipart(image_form(create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["url"], DELIVERY_URL);
    assert_eq!(app.platform.status_count(), 3);
}

#[tokio::test]
async fn oversize_image_rejected_before_any_network_call() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;

    let response = app
        .client()
        .post("/api/upload-file")
        .multipart(image_form(create_oversize_blob(11 * 1024 * 1024)))
        .await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(app.platform.staged_count(), 0);
    assert_eq!(app.platform.blob_count(), 0);
    assert_eq!(app.platform.create_count(), 0);
}

#[tokio::test]
async fn oversize_rejection_leaves_a_registered_job_in_waiting() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;
    let client = app.client();

    let init = client
        .post("/api/init-upload")
        .json(&serde_json::json!({ "filename": "big.png", "fileType": "image/png" }))
        .await;
    let upload_id = init.json::<Value>()["uploadId"]
        .as_str()
        .map(str::to_string)
        .unwrap();

    let form = image_form(create_oversize_blob(11 * 1024 * 1024))
        .add_text("uploadId", upload_id.clone());
    let upload = client.post("/api/upload-file").multipart(form).await;
    assert_eq!(upload.status_code(), 400);

    // Pre-flight validation is not a protocol-stage failure; the job never
    // left `waiting` and may still be retried with a smaller file.
    let status = client
        .get(&format!("/api/upload-status/{}", upload_id))
        .await;
    let job: Value = status.json();
    assert_eq!(job["status"], "waiting");
    assert!(job.get("error").is_none());
}

#[tokio::test]
async fn poll_exhaustion_fails_the_job() {
    let app = setup_test_app(Arc::new(MockPlatform::with_status_script(
        StatusScript::NeverReady,
    )))
    .await;

    let response = app
        .client()
        .post("/api/upload-file")
        .multipart(image_form(create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), 500);
    // Config caps polling at 5 attempts.
    assert_eq!(app.platform.status_count(), 5);
}

#[tokio::test]
async fn failed_file_status_fails_the_job() {
    let app = setup_test_app(Arc::new(MockPlatform::with_status_script(
        StatusScript::AlwaysFailed,
    )))
    .await;

    let response = app
        .client()
        .post("/api/upload-file")
        .multipart(image_form(create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), 500);
    assert_eq!(app.platform.status_count(), 1);
}

#[tokio::test]
async fn platform_error_detail_is_not_leaked_to_clients() {
    let app = setup_test_app(Arc::new(MockPlatform::failing_staged_create())).await;

    let response = app
        .client()
        .post("/api/upload-file")
        .multipart(image_form(create_minimal_png()))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Upload failed");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;

    let form = MultipartForm::new().add_text("fileType", "image/png");
    let response = app.client().post("/api/upload-file").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No file provided");
}

#[tokio::test]
async fn init_then_upload_then_status_reports_completed() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;
    let client = app.client();

    let init = client
        .post("/api/init-upload")
        .json(&serde_json::json!({ "filename": "photo.png", "fileType": "image/png" }))
        .await;
    assert_eq!(init.status_code(), 200);
    let upload_id = init.json::<Value>()["uploadId"]
        .as_str()
        .map(str::to_string)
        .unwrap();

    let form = image_form(create_minimal_png()).add_text("uploadId", upload_id.clone());
    let upload = client.post("/api/upload-file").multipart(form).await;
    assert_eq!(upload.status_code(), 200);

    let status = client
        .get(&format!("/api/upload-status/{}", upload_id))
        .await;
    assert_eq!(status.status_code(), 200);
    let job: Value = status.json();
    assert_eq!(job["status"], "completed");
    assert_eq!(job["progress"], 100);
    assert_eq!(job["url"], DELIVERY_URL);
    assert_eq!(job["originalFilename"], "photo.png");
}

#[tokio::test]
async fn init_upload_requires_filename_and_file_type() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;

    let missing_name = app
        .client()
        .post("/api/init-upload")
        .json(&serde_json::json!({ "fileType": "image/png" }))
        .await;
    assert_eq!(missing_name.status_code(), 400);

    let missing_type = app
        .client()
        .post("/api/init-upload")
        .json(&serde_json::json!({ "filename": "photo.png" }))
        .await;
    assert_eq!(missing_type.status_code(), 400);
}

#[tokio::test]
async fn unknown_ids_return_404() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;
    let id = uuid::Uuid::new_v4();

    let status = app
        .client()
        .get(&format!("/api/upload-status/{}", id))
        .await;
    assert_eq!(status.status_code(), 404);

    let cancel = app
        .client()
        .delete(&format!("/api/cancel-upload/{}", id))
        .await;
    assert_eq!(cancel.status_code(), 404);
}

#[tokio::test]
async fn cancelled_job_rejects_the_file_transfer() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;
    let client = app.client();

    let init = client
        .post("/api/init-upload")
        .json(&serde_json::json!({ "filename": "photo.png", "fileType": "image/png" }))
        .await;
    let upload_id = init.json::<Value>()["uploadId"]
        .as_str()
        .map(str::to_string)
        .unwrap();

    let cancel = client
        .delete(&format!("/api/cancel-upload/{}", upload_id))
        .await;
    assert_eq!(cancel.status_code(), 200);
    assert_eq!(cancel.json::<Value>()["success"], true);

    let form = image_form(create_minimal_png()).add_text("uploadId", upload_id.clone());
    let upload = client.post("/api/upload-file").multipart(form).await;
    assert_eq!(upload.status_code(), 400);
    assert_eq!(
        upload.json::<Value>()["error"],
        "Upload cancelled by user"
    );
    assert_eq!(app.platform.staged_count(), 0);
}

#[tokio::test]
async fn cancel_interrupts_an_in_flight_upload() {
    let app = setup_test_app(Arc::new(MockPlatform::with_status_script(
        StatusScript::HangUntilCancelled,
    )))
    .await;
    let client = app.client();

    let init = client
        .post("/api/init-upload")
        .json(&serde_json::json!({ "filename": "photo.png", "fileType": "image/png" }))
        .await;
    let upload_id = init.json::<Value>()["uploadId"]
        .as_str()
        .map(str::to_string)
        .unwrap();

    let form = image_form(create_minimal_png()).add_text("uploadId", upload_id.clone());
    let upload_fut = client.post("/api/upload-file").multipart(form);
    let cancel_fut = async {
        // Let the upload reach the hanging status poll first.
        tokio::time::sleep(Duration::from_millis(100)).await;
        client
            .delete(&format!("/api/cancel-upload/{}", upload_id))
            .await
    };

    let (upload, cancel) = tokio::join!(upload_fut, cancel_fut);
    assert_eq!(cancel.status_code(), 200);
    assert_eq!(upload.status_code(), 400);
    assert_eq!(
        upload.json::<Value>()["error"],
        "Upload cancelled by user"
    );

    let status = client
        .get(&format!("/api/upload-status/{}", upload_id))
        .await;
    let job: Value = status.json();
    assert_eq!(job["status"], "cancelled");
}

#[tokio::test]
async fn undecodable_image_falls_back_to_original_bytes() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;

    // Compression fails on these bytes; the upload proceeds with them as-is.
    let form = image_form(b"not actually a png".to_vec());
    let response = app.client().post("/api/upload-file").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.platform.blob_count(), 1);
}

#[tokio::test]
async fn generic_file_type_uploads_without_compression() {
    let app = setup_test_app(Arc::new(MockPlatform::with_create_url())).await;

    let form = MultipartForm::new()
        .add_part(
            "file",
            Part::bytes(b"%PDF-1.4 test".to_vec())
                .file_name("doc.pdf")
                .mime_type("application/pdf"),
        )
        .add_text("fileType", "application/pdf");
    let response = app.client().post("/api/upload-file").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(app.platform.staged_count(), 1);
}
