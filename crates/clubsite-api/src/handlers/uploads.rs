//! Upload, resolve and delete endpoints over the storage gateway.
//!
//! References are handed back to the client exactly as the gateway produced them;
//! the owning record (news item, gallery photo, document) stores that string.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use clubsite_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const FILE_FIELD: &str = "file";

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    /// Destination folder, e.g. `documents` or `gallery/<album>`
    #[serde(default)]
    pub folder: String,
}

#[derive(Debug, Deserialize)]
pub struct ReferenceQuery {
    pub reference: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub reference: String,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ResolveResponse {
    pub url: String,
}

/// The single file part of an upload form
struct UploadedFile {
    data: Vec<u8>,
    original_name: String,
    content_type: String,
}

/// Pull the `file` field out of the form, enforcing the configured size cap.
async fn extract_file_field(
    mut multipart: Multipart,
    max_size_bytes: usize,
) -> Result<UploadedFile, HttpAppError> {
    let mut upload: Option<UploadedFile> = None;

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        if upload.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            )
            .into());
        }

        let original_name = field.file_name().unwrap_or("unknown").to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await?;

        if data.len() > max_size_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "{} bytes exceeds max {} bytes",
                data.len(),
                max_size_bytes
            ))
            .into());
        }

        upload = Some(UploadedFile {
            data: data.to_vec(),
            original_name,
            content_type,
        });
    }

    upload.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()).into())
}

/// `POST /api/uploads?folder=...`
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UploadQuery>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let file = extract_file_field(multipart, state.config.max_upload_size_bytes()).await?;
    let size = file.data.len();

    let stored = state
        .storage
        .store(&query.folder, &file.original_name, &file.content_type, file.data)
        .await?;

    tracing::info!(
        folder = %query.folder,
        original_name = %file.original_name,
        reference = %stored.reference,
        size_bytes = size,
        "File uploaded"
    );

    let url = state.storage.resolve(&stored.reference).await;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            reference: stored.reference,
            filename: stored.filename,
            url,
        }),
    ))
}

/// `GET /api/uploads/resolve?reference=...`
pub async fn resolve_reference(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReferenceQuery>,
) -> Json<ResolveResponse> {
    let url = state
        .storage
        .resolve(query.reference.as_deref().unwrap_or_default())
        .await;
    Json(ResolveResponse { url })
}

/// `DELETE /api/uploads?reference=...`
///
/// Always 204: a failed delete must not block removing the record that owned the file.
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ReferenceQuery>,
) -> StatusCode {
    if let Some(reference) = query.reference.as_deref() {
        state.storage.delete(reference).await;
    }
    StatusCode::NO_CONTENT
}
