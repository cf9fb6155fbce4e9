#![allow(dead_code)]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resume_id: Option<Uuid>,
    pub title: String,
    pub doc_type: String,
    /// Key in the documents bucket, prefixed by the owning user's id.
    pub file_path: String,
    pub file_name: String,
    pub content_type: String,
    pub extracted_content: Option<Value>,
    pub status: String,
    pub blob_state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Certificate,
    Project,
    Education,
    Experience,
    Skill,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Certificate => "certificate",
            DocumentType::Project => "project",
            DocumentType::Education => "education",
            DocumentType::Experience => "experience",
            DocumentType::Skill => "skill",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "certificate" => Some(DocumentType::Certificate),
            "project" => Some(DocumentType::Project),
            "education" => Some(DocumentType::Education),
            "experience" => Some(DocumentType::Experience),
            "skill" => Some(DocumentType::Skill),
            _ => None,
        }
    }
}

/// Extraction lifecycle of an uploaded document. Transitions past `Pending`
/// are applied from completion events posted by the extraction service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Pending => "pending",
            DocumentStatus::Processing => "processing",
            DocumentStatus::Completed => "completed",
            DocumentStatus::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(DocumentStatus::Pending),
            "processing" => Some(DocumentStatus::Processing),
            "completed" => Some(DocumentStatus::Completed),
            "error" => Some(DocumentStatus::Error),
            _ => None,
        }
    }
}

/// Durable marker for the row-first upload saga and blob-first delete saga.
/// `Staged` rows exist before their blob is confirmed written; `Removing`
/// rows are mid-delete. Only `Stored` rows are visible to reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlobState {
    Staged,
    Stored,
    Removing,
}

impl BlobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlobState::Staged => "staged",
            BlobState::Stored => "stored",
            BlobState::Removing => "removing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_doc_type_round_trip() {
        for s in ["certificate", "project", "education", "experience", "skill"] {
            assert_eq!(DocumentType::parse(s).unwrap().as_str(), s);
        }
    }

    #[test]
    fn test_doc_type_rejects_unknown() {
        assert!(DocumentType::parse("diploma").is_none());
        assert!(DocumentType::parse("").is_none());
        assert!(DocumentType::parse("Certificate").is_none());
    }

    #[test]
    fn test_status_round_trip() {
        for s in ["pending", "processing", "completed", "error"] {
            assert_eq!(DocumentStatus::parse(s).unwrap().as_str(), s);
        }
    }
}
