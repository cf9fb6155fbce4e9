use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::errors::AppError;
use crate::models::resume::ResumeRow;
use crate::resumes::content::ResumeContent;
use crate::state::AppState;

pub const DEFAULT_TITLE: &str = "My Resume";

/// Resume as returned to clients: stored content normalized through the
/// tolerant view, so missing fields always read as defaults.
#[derive(Debug, Serialize)]
pub struct ResumeResponse {
    pub id: Uuid,
    pub title: String,
    pub content: ResumeContent,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ResumeRow> for ResumeResponse {
    fn from(row: ResumeRow) -> Self {
        let content = ResumeContent::from_stored(&row.content);
        ResumeResponse {
            id: row.id,
            title: row.title,
            content,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Serialize)]
pub struct ActiveResumeResponse {
    /// None when the user has not created a resume yet. Absence is a
    /// normal empty state, not an error.
    pub resume: Option<ResumeResponse>,
}

#[derive(Debug, Deserialize)]
pub struct CreateResumeRequest {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateResumeRequest {
    pub title: Option<String>,
    pub content: Option<Value>,
}

pub async fn fetch_active_resume(
    state: &AppState,
    user_id: Uuid,
) -> Result<Option<ResumeRow>, AppError> {
    let resume: Option<ResumeRow> =
        sqlx::query_as("SELECT * FROM resumes WHERE user_id = $1 AND is_active = TRUE")
            .bind(user_id)
            .fetch_optional(&state.db)
            .await?;
    Ok(resume)
}

/// GET /api/v1/resume
pub async fn handle_get_active(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
) -> Result<Json<ActiveResumeResponse>, AppError> {
    let resume = fetch_active_resume(&state, user.id).await?;
    Ok(Json(ActiveResumeResponse {
        resume: resume.map(ResumeResponse::from),
    }))
}

/// POST /api/v1/resume
/// Creates the user's resume from the empty skeleton with the account
/// email pre-filled. The partial unique index on (user_id) WHERE is_active
/// makes a second concurrent create a clean 409 instead of a silent
/// duplicate.
pub async fn handle_create(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    body: Option<Json<CreateResumeRequest>>,
) -> Result<(StatusCode, Json<ResumeResponse>), AppError> {
    let title = body
        .and_then(|Json(b)| b.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let content = ResumeContent::skeleton(&user.email).to_value();

    let resume: ResumeRow = sqlx::query_as(
        r#"
        INSERT INTO resumes (id, user_id, title, content, is_active)
        VALUES ($1, $2, $3, $4, TRUE)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(user.id)
    .bind(&title)
    .bind(&content)
    .fetch_one(&state.db)
    .await
    .map_err(|e| AppError::from_insert(e, "an active resume already exists"))?;

    tracing::info!(user_id = %user.id, resume_id = %resume.id, "Created resume");

    Ok((StatusCode::CREATED, Json(ResumeResponse::from(resume))))
}

/// PATCH /api/v1/resume
/// Updates the active resume's title and/or content. Incoming content is
/// normalized through the tolerant view before it is stored.
pub async fn handle_update(
    State(state): State<AppState>,
    Extension(AuthUser(user)): Extension<AuthUser>,
    Json(body): Json<UpdateResumeRequest>,
) -> Result<Json<ResumeResponse>, AppError> {
    if body.title.is_none() && body.content.is_none() {
        return Err(AppError::Validation(
            "provide a title or content to update".to_string(),
        ));
    }

    let title = body
        .title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());
    let content = body
        .content
        .map(|c| ResumeContent::from_stored(&c).to_value());

    let resume: Option<ResumeRow> = sqlx::query_as(
        r#"
        UPDATE resumes
        SET title = COALESCE($1, title),
            content = COALESCE($2, content),
            updated_at = NOW()
        WHERE user_id = $3 AND is_active = TRUE
        RETURNING *
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(user.id)
    .fetch_optional(&state.db)
    .await?;

    let resume = resume.ok_or_else(|| AppError::NotFound("no active resume".to_string()))?;

    Ok(Json(ResumeResponse::from(resume)))
}
