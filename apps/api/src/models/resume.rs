use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: Value,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeVersionRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    /// Unique and monotonically increasing per resume.
    pub version_number: i32,
    /// Immutable snapshot of the resume content at creation time.
    pub content: Value,
    pub pdf_path: Option<String>,
    pub docx_path: Option<String>,
    pub change_description: Option<String>,
    pub created_at: DateTime<Utc>,
}
