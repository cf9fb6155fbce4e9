use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{ResumeRow, ResumeVersionRow};

/// Snapshots the resume's current content as the next version.
///
/// The parent resume row is locked for the duration of the transaction so
/// concurrent snapshots serialize and version numbers stay dense and
/// monotonic; the (resume_id, version_number) unique index is the backstop.
/// A version's content is never modified after this insert.
pub async fn create_snapshot(
    pool: &PgPool,
    resume: &ResumeRow,
    change_description: Option<&str>,
) -> Result<ResumeVersionRow, AppError> {
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT id FROM resumes WHERE id = $1 FOR UPDATE")
        .bind(resume.id)
        .execute(&mut *tx)
        .await?;

    let current_max: Option<i32> =
        sqlx::query_scalar("SELECT MAX(version_number) FROM resume_versions WHERE resume_id = $1")
            .bind(resume.id)
            .fetch_one(&mut *tx)
            .await?;
    let version_number = current_max.unwrap_or(0) + 1;

    let version: ResumeVersionRow = sqlx::query_as(
        r#"
        INSERT INTO resume_versions (id, resume_id, version_number, content, change_description)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(resume.id)
    .bind(version_number)
    .bind(&resume.content)
    .bind(change_description)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(resume_id = %resume.id, version = version_number, "Created resume version");

    Ok(version)
}
