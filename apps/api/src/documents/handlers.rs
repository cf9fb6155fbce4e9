use axum::{
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    Extension, Json,
};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::documents::validation::{document_key, validate_upload};
use crate::errors::AppError;
use crate::jobs::{self, ExtractionJob};
use crate::models::document::{BlobState, DocumentRow, DocumentStatus};
use crate::state::AppState;

/// GET /api/v1/documents
/// The caller's documents, newest first. Rows mid-saga are not visible.
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Json<Vec<DocumentRow>>, AppError> {
    let documents: Vec<DocumentRow> = sqlx::query_as(
        r#"
        SELECT * FROM documents
        WHERE user_id = $1 AND blob_state = $2
        ORDER BY created_at DESC
        "#,
    )
    .bind(user.id)
    .bind(BlobState::Stored.as_str())
    .fetch_all(&state.db)
    .await?;

    Ok(Json(documents))
}

/// POST /api/v1/documents  (multipart: title, doc_type, file)
///
/// Row-first saga: the durable row (blob_state = staged) is written before
/// the blob, so no blob can ever exist without a row naming it. A failed
/// blob write compensates by deleting the staged row; the sweep finishes
/// anything the compensation itself missed.
pub async fn handle_upload(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DocumentRow>), AppError> {
    let mut title = String::new();
    let mut doc_type = String::new();
    let mut file_name: Option<String> = None;
    let mut content_type = "application/octet-stream".to_string();
    let mut data = Bytes::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("malformed multipart body: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("title") => {
                title = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable title field: {e}")))?;
            }
            Some("doc_type") => {
                doc_type = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable doc_type field: {e}")))?;
            }
            Some("file") => {
                file_name = field.file_name().map(|s| s.to_string());
                if let Some(ct) = field.content_type() {
                    content_type = ct.to_string();
                }
                data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("unreadable file field: {e}")))?;
            }
            _ => {}
        }
    }

    // All validation happens before any storage or database write.
    let upload = validate_upload(&title, &doc_type, file_name.as_deref(), data.len())?;

    let document_id = Uuid::new_v4();
    let file_path = document_key(user.id, document_id, &upload.file_name);

    sqlx::query(
        r#"
        INSERT INTO documents
            (id, user_id, title, doc_type, file_path, file_name, content_type, status, blob_state)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        "#,
    )
    .bind(document_id)
    .bind(user.id)
    .bind(&upload.title)
    .bind(upload.doc_type.as_str())
    .bind(&file_path)
    .bind(&upload.file_name)
    .bind(&content_type)
    .bind(DocumentStatus::Pending.as_str())
    .bind(BlobState::Staged.as_str())
    .execute(&state.db)
    .await?;

    if let Err(put_err) = state
        .store
        .put(&state.config.documents_bucket, &file_path, data, &content_type)
        .await
    {
        // Compensate: the staged row must not outlive a failed blob write.
        // If the compensating delete also fails the sweep removes it later.
        if let Err(del_err) = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(document_id)
            .execute(&state.db)
            .await
        {
            warn!("Failed to compensate staged document {document_id}: {del_err}");
        }
        return Err(AppError::Storage(put_err));
    }

    let document: DocumentRow = sqlx::query_as(
        r#"
        UPDATE documents
        SET blob_state = $1, updated_at = NOW()
        WHERE id = $2
        RETURNING *
        "#,
    )
    .bind(BlobState::Stored.as_str())
    .bind(document_id)
    .fetch_one(&state.db)
    .await?;

    // Extraction runs out of process; a failed enqueue leaves the document
    // pending and is retried by re-upload, not by failing this request.
    let job = ExtractionJob {
        document_id,
        user_id: user.id,
        file_path: file_path.clone(),
    };
    if let Err(e) = jobs::enqueue_extraction(&state.redis, &job).await {
        warn!("Failed to enqueue extraction for document {document_id}: {e}");
    }

    info!(user_id = %user.id, document_id = %document_id, "Uploaded document '{}'", upload.title);

    Ok((StatusCode::CREATED, Json(document)))
}

/// DELETE /api/v1/documents/:id
///
/// Blob first, then row. If blob removal fails the row is restored to its
/// stored state and the error surfaces; the record is never silently
/// deleted ahead of its blob.
pub async fn handle_delete(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(document_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let document: Option<DocumentRow> = sqlx::query_as(
        r#"
        UPDATE documents
        SET blob_state = $1, updated_at = NOW()
        WHERE id = $2 AND user_id = $3 AND blob_state = $4
        RETURNING *
        "#,
    )
    .bind(BlobState::Removing.as_str())
    .bind(document_id)
    .bind(user.id)
    .bind(BlobState::Stored.as_str())
    .fetch_optional(&state.db)
    .await?;

    let document =
        document.ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;

    if let Err(remove_err) = state
        .store
        .remove(&state.config.documents_bucket, &document.file_path)
        .await
    {
        // Restore the row so the record never reads as deleted while its
        // blob still exists. If the restore itself fails the row stays
        // 'removing' and the sweep finishes the delete later.
        if let Err(revert_err) =
            sqlx::query("UPDATE documents SET blob_state = $1, updated_at = NOW() WHERE id = $2")
                .bind(BlobState::Stored.as_str())
                .bind(document_id)
                .execute(&state.db)
                .await
        {
            warn!("Failed to restore document {document_id} after blob removal failure: {revert_err}");
        }
        return Err(AppError::Storage(remove_err));
    }

    sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(document_id)
        .execute(&state.db)
        .await?;

    info!(user_id = %user.id, document_id = %document_id, "Deleted document");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/documents/:id/download
pub async fn handle_download(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(document_id): Path<Uuid>,
) -> Result<([(header::HeaderName, String); 2], Bytes), AppError> {
    let document: Option<DocumentRow> = sqlx::query_as(
        "SELECT * FROM documents WHERE id = $1 AND user_id = $2 AND blob_state = $3",
    )
    .bind(document_id)
    .bind(user.id)
    .bind(BlobState::Stored.as_str())
    .fetch_optional(&state.db)
    .await?;

    let document =
        document.ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;

    let bytes = state
        .store
        .get(&state.config.documents_bucket, &document.file_path)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, document.content_type.clone()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", document.file_name),
            ),
        ],
        bytes,
    ))
}
