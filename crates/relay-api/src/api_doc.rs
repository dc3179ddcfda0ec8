//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use relay_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Shopify Upload Relay",
        version = "0.1.0",
        description = "Backend relay that hides Shopify's staged-upload protocol and access token behind a small HTTP API. Clients register an upload, send the file once, and poll a job record while the relay drives compression, staged upload, file registration, and readiness polling."
    ),
    paths(
        handlers::init_upload::init_upload,
        handlers::upload_file::upload_file,
        handlers::upload_status::upload_status,
        handlers::cancel_upload::cancel_upload,
        handlers::proxy::admin_proxy,
        handlers::health::health_check,
    ),
    components(schemas(
        models::InitUploadRequest,
        models::InitUploadResponse,
        models::UploadFileResponse,
        models::CancelUploadResponse,
        models::UploadJob,
        models::UploadStatus,
        models::MediaKind,
        error::ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Upload job lifecycle"),
        (name = "proxy", description = "Authenticated Admin API passthrough"),
        (name = "health", description = "Service probes")
    )
)]
pub struct ApiDoc;
