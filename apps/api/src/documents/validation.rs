use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::DocumentType;

/// Validated upload metadata. Produced before any I/O happens.
#[derive(Debug)]
pub struct UploadRequest {
    pub title: String,
    pub doc_type: DocumentType,
    pub file_name: String,
}

/// Validates upload fields. Title and type must be non-empty and the type
/// must be one of the known document kinds.
pub fn validate_upload(
    title: &str,
    doc_type: &str,
    file_name: Option<&str>,
    file_len: usize,
) -> Result<UploadRequest, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title must not be empty".to_string()));
    }

    let doc_type = DocumentType::parse(doc_type.trim()).ok_or_else(|| {
        AppError::Validation(format!(
            "unknown document type '{}': expected one of certificate, project, education, experience, skill",
            doc_type
        ))
    })?;

    if file_len == 0 {
        return Err(AppError::Validation("file must not be empty".to_string()));
    }

    let file_name = sanitize_filename(file_name.unwrap_or(""));

    Ok(UploadRequest {
        title: title.to_string(),
        doc_type,
        file_name,
    })
}

/// Builds the blob key for an upload: prefixed by the owning user's id so
/// storage stays partitioned per user, with the document id as the
/// uniqueness token.
pub fn document_key(user_id: Uuid, document_id: Uuid, file_name: &str) -> String {
    format!("{user_id}/{document_id}/{file_name}")
}

/// Strips path components and anything outside `[A-Za-z0-9._-]` from a
/// client-supplied filename. An empty result falls back to "file".
pub fn sanitize_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_upload_passes() {
        let req = validate_upload("AWS Cert", "certificate", Some("aws-cert.pdf"), 1024).unwrap();
        assert_eq!(req.title, "AWS Cert");
        assert_eq!(req.doc_type, DocumentType::Certificate);
        assert_eq!(req.file_name, "aws-cert.pdf");
    }

    #[test]
    fn test_empty_title_rejected_before_io() {
        assert!(matches!(
            validate_upload("   ", "certificate", Some("a.pdf"), 10),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_type_rejected() {
        assert!(matches!(
            validate_upload("Title", "diploma", Some("a.pdf"), 10),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(matches!(
            validate_upload("Title", "project", Some("a.pdf"), 0),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_title_is_trimmed() {
        let req = validate_upload("  My Project  ", "project", Some("p.md"), 5).unwrap();
        assert_eq!(req.title, "My Project");
    }

    #[test]
    fn test_key_is_prefixed_by_user_id() {
        let user_id = Uuid::new_v4();
        let document_id = Uuid::new_v4();
        let key = document_key(user_id, document_id, "cert.pdf");
        assert!(key.starts_with(&user_id.to_string()));
        assert!(key.ends_with("/cert.pdf"));
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\temp\\evil.exe"), "evil.exe");
    }

    #[test]
    fn test_sanitize_replaces_odd_characters() {
        assert_eq!(sanitize_filename("my résumé (final).pdf"), "my_r_sum___final_.pdf");
    }

    #[test]
    fn test_sanitize_empty_falls_back() {
        assert_eq!(sanitize_filename(""), "file");
        assert_eq!(sanitize_filename("..."), "file");
    }
}
