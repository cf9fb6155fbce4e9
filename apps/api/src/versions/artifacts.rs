use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::resume::ResumeVersionRow;
use crate::storage::ObjectStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Docx,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Docx => "docx",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pdf" => Some(ExportFormat::Pdf),
            "docx" => Some(ExportFormat::Docx),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "application/pdf",
            ExportFormat::Docx => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
        }
    }
}

/// A generated export ready to hand to the client.
#[derive(Debug)]
pub struct ArtifactDownload {
    pub bytes: Bytes,
    pub content_type: &'static str,
    pub filename: String,
}

/// The stored artifact key for the requested format, if one was generated.
pub fn artifact_path(version: &ResumeVersionRow, format: ExportFormat) -> Option<&str> {
    match format {
        ExportFormat::Pdf => version.pdf_path.as_deref(),
        ExportFormat::Docx => version.docx_path.as_deref(),
    }
}

pub fn suggested_filename(version_number: i32, format: ExportFormat) -> String {
    format!("resume-v{}.{}", version_number, format.as_str())
}

/// Fetches a version's export artifact. An absent path is a user-facing
/// not-available condition and returns before any storage call is made.
pub async fn fetch_artifact(
    store: &dyn ObjectStore,
    bucket: &str,
    version: &ResumeVersionRow,
    format: ExportFormat,
) -> Result<ArtifactDownload, AppError> {
    let Some(path) = artifact_path(version, format) else {
        return Err(AppError::ArtifactUnavailable(format!(
            "no {} has been generated for version {}",
            format.as_str().to_uppercase(),
            version.version_number
        )));
    };

    let bytes = store.get(bucket, path).await?;

    Ok(ArtifactDownload {
        bytes,
        content_type: format.content_type(),
        filename: suggested_filename(version.version_number, format),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use chrono::Utc;
    use serde_json::json;
    use uuid::Uuid;

    use super::*;
    use crate::storage::MemoryObjectStore;

    fn version(pdf_path: Option<&str>, docx_path: Option<&str>) -> ResumeVersionRow {
        ResumeVersionRow {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            version_number: 3,
            content: json!({}),
            pdf_path: pdf_path.map(String::from),
            docx_path: docx_path.map(String::from),
            change_description: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("pdf"), Some(ExportFormat::Pdf));
        assert_eq!(ExportFormat::parse("docx"), Some(ExportFormat::Docx));
        assert_eq!(ExportFormat::parse("odt"), None);
    }

    #[test]
    fn test_suggested_filename() {
        assert_eq!(suggested_filename(3, ExportFormat::Pdf), "resume-v3.pdf");
        assert_eq!(suggested_filename(12, ExportFormat::Docx), "resume-v12.docx");
    }

    #[tokio::test]
    async fn test_absent_path_makes_no_storage_call() {
        let store = MemoryObjectStore::new();
        let v = version(Some("u/pdf-key"), None);

        let err = fetch_artifact(&store, "generated-resumes", &v, ExportFormat::Docx)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ArtifactUnavailable(_)));
        assert_eq!(store.get_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_present_path_downloads_with_filename() {
        let store = MemoryObjectStore::new();
        store.insert("generated-resumes", "u/pdf-key", Bytes::from_static(b"%PDF"));
        let v = version(Some("u/pdf-key"), None);

        let download = fetch_artifact(&store, "generated-resumes", &v, ExportFormat::Pdf)
            .await
            .unwrap();

        assert_eq!(download.bytes, Bytes::from_static(b"%PDF"));
        assert_eq!(download.filename, "resume-v3.pdf");
        assert_eq!(download.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_missing_blob_surfaces_not_found() {
        let store = MemoryObjectStore::new();
        let v = version(None, Some("u/docx-key"));

        let err = fetch_artifact(&store, "generated-resumes", &v, ExportFormat::Docx)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Storage(_)));
    }
}
