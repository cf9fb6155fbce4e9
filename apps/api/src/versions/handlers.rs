use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    Extension, Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::errors::AppError;
use crate::jobs::{self, RenderJob};
use crate::models::resume::ResumeVersionRow;
use crate::resumes::handlers::fetch_active_resume;
use crate::state::AppState;
use crate::versions::artifacts::{artifact_path, fetch_artifact, ExportFormat};
use crate::versions::snapshot::create_snapshot;

#[derive(Debug, Deserialize)]
pub struct CreateVersionRequest {
    pub change_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub format: String,
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub format: String,
}

#[derive(Serialize)]
pub struct GenerateResponse {
    pub status: &'static str,
}

fn parse_format(raw: &str) -> Result<ExportFormat, AppError> {
    ExportFormat::parse(raw).ok_or_else(|| {
        AppError::Validation(format!("unknown format '{raw}': expected pdf or docx"))
    })
}

async fn fetch_version(
    state: &AppState,
    resume_id: Uuid,
    version_number: i32,
) -> Result<ResumeVersionRow, AppError> {
    let version: Option<ResumeVersionRow> = sqlx::query_as(
        "SELECT * FROM resume_versions WHERE resume_id = $1 AND version_number = $2",
    )
    .bind(resume_id)
    .bind(version_number)
    .fetch_optional(&state.db)
    .await?;

    version.ok_or_else(|| AppError::NotFound(format!("Version {version_number} not found")))
}

/// GET /api/v1/resume/versions
/// Versions of the caller's active resume, newest first. A user with no
/// active resume gets an empty list, not an error.
pub async fn handle_list(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Json<Vec<ResumeVersionRow>>, AppError> {
    let Some(resume) = fetch_active_resume(&state, user.id).await? else {
        return Ok(Json(Vec::new()));
    };

    let versions: Vec<ResumeVersionRow> = sqlx::query_as(
        "SELECT * FROM resume_versions WHERE resume_id = $1 ORDER BY version_number DESC",
    )
    .bind(resume.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(versions))
}

/// POST /api/v1/resume/versions
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Option<Json<CreateVersionRequest>>,
) -> Result<(StatusCode, Json<ResumeVersionRow>), AppError> {
    let resume = fetch_active_resume(&state, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no active resume to snapshot".to_string()))?;

    let change_description = body.and_then(|Json(b)| b.change_description);
    let version = create_snapshot(&state.db, &resume, change_description.as_deref()).await?;

    Ok((StatusCode::CREATED, Json(version)))
}

/// GET /api/v1/resume/versions/:v/download?format=pdf|docx
pub async fn handle_download(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(version_number): Path<i32>,
    Query(query): Query<DownloadQuery>,
) -> Result<([(header::HeaderName, String); 2], Bytes), AppError> {
    let format = parse_format(&query.format)?;

    let resume = fetch_active_resume(&state, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no active resume".to_string()))?;
    let version = fetch_version(&state, resume.id, version_number).await?;

    let download =
        fetch_artifact(state.store.as_ref(), &state.config.exports_bucket, &version, format)
            .await?;

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", download.filename),
            ),
        ],
        download.bytes,
    ))
}

/// POST /api/v1/resume/versions/:v/generate
/// Hands the version to the external rendering service via the job queue.
/// Already-generated artifacts are reported as available without enqueueing
/// a duplicate job.
pub async fn handle_generate(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Path(version_number): Path<i32>,
    Json(body): Json<GenerateRequest>,
) -> Result<(StatusCode, Json<GenerateResponse>), AppError> {
    let format = parse_format(&body.format)?;

    let resume = fetch_active_resume(&state, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("no active resume".to_string()))?;
    let version = fetch_version(&state, resume.id, version_number).await?;

    if artifact_path(&version, format).is_some() {
        return Ok((StatusCode::OK, Json(GenerateResponse { status: "available" })));
    }

    let job = RenderJob {
        version_id: version.id,
        resume_id: resume.id,
        user_id: user.id,
        version_number: version.version_number,
        format: format.as_str().to_string(),
    };
    jobs::enqueue_render(&state.redis, &job).await?;

    Ok((StatusCode::ACCEPTED, Json(GenerateResponse { status: "queued" })))
}
