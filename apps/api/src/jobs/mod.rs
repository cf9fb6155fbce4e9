use std::time::Duration;

use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::document::DocumentStatus;

/// Outbound queue for document text extraction.
pub const EXTRACTION_QUEUE: &str = "jobs:document-extraction";
/// Outbound queue for PDF/DOCX rendering.
pub const RENDER_QUEUE: &str = "jobs:resume-render";
/// Inbound queue of completion events posted by the processing services.
pub const EVENTS_QUEUE: &str = "events:processing";

#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractionJob {
    pub document_id: Uuid,
    pub user_id: Uuid,
    pub file_path: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RenderJob {
    pub version_id: Uuid,
    pub resume_id: Uuid,
    pub user_id: Uuid,
    pub version_number: i32,
    pub format: String,
}

/// Completion events the extraction and render services post back.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessingEvent {
    ExtractionStarted {
        document_id: Uuid,
    },
    ExtractionCompleted {
        document_id: Uuid,
        extracted_content: Value,
    },
    ExtractionFailed {
        document_id: Uuid,
        message: String,
    },
    RenderCompleted {
        version_id: Uuid,
        format: String,
        artifact_path: String,
    },
}

pub async fn enqueue_extraction(redis: &RedisClient, job: &ExtractionJob) -> Result<(), AppError> {
    push(redis, EXTRACTION_QUEUE, &serde_json::to_string(job).unwrap_or_default()).await
}

pub async fn enqueue_render(redis: &RedisClient, job: &RenderJob) -> Result<(), AppError> {
    push(redis, RENDER_QUEUE, &serde_json::to_string(job).unwrap_or_default()).await
}

async fn push(redis: &RedisClient, queue: &str, payload: &str) -> Result<(), AppError> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    let _: () = conn.rpush(queue, payload).await?;
    Ok(())
}

/// Background loop draining completion events into the database.
pub async fn run_event_poller(pool: PgPool, redis: RedisClient, interval_secs: u64) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        if let Err(e) = drain_events(&pool, &redis).await {
            warn!("Processing-event poll failed: {e}");
        }
    }
}

async fn drain_events(pool: &PgPool, redis: &RedisClient) -> anyhow::Result<()> {
    let mut conn = redis.get_multiplexed_async_connection().await?;
    loop {
        let payload: Option<String> = conn.lpop(EVENTS_QUEUE, None).await?;
        let Some(payload) = payload else { break };

        match serde_json::from_str::<ProcessingEvent>(&payload) {
            Ok(event) => {
                if let Err(e) = apply_event(pool, &event).await {
                    warn!("Failed to apply processing event: {e}");
                }
            }
            Err(e) => warn!("Discarding malformed processing event: {e}"),
        }
    }
    Ok(())
}

/// Applies one completion event. Events referencing rows that no longer
/// exist (e.g. the document was deleted mid-extraction) are no-ops.
pub async fn apply_event(pool: &PgPool, event: &ProcessingEvent) -> Result<(), sqlx::Error> {
    match event {
        ProcessingEvent::ExtractionStarted { document_id } => {
            sqlx::query(
                "UPDATE documents SET status = $1, updated_at = NOW() WHERE id = $2 AND status = $3",
            )
            .bind(DocumentStatus::Processing.as_str())
            .bind(document_id)
            .bind(DocumentStatus::Pending.as_str())
            .execute(pool)
            .await?;
        }
        ProcessingEvent::ExtractionCompleted {
            document_id,
            extracted_content,
        } => {
            sqlx::query(
                r#"
                UPDATE documents
                SET status = $1, extracted_content = $2, updated_at = NOW()
                WHERE id = $3
                "#,
            )
            .bind(DocumentStatus::Completed.as_str())
            .bind(extracted_content)
            .bind(document_id)
            .execute(pool)
            .await?;
            info!(document_id = %document_id, "Extraction completed");
        }
        ProcessingEvent::ExtractionFailed {
            document_id,
            message,
        } => {
            sqlx::query("UPDATE documents SET status = $1, updated_at = NOW() WHERE id = $2")
                .bind(DocumentStatus::Error.as_str())
                .bind(document_id)
                .execute(pool)
                .await?;
            warn!(document_id = %document_id, "Extraction failed: {message}");
        }
        ProcessingEvent::RenderCompleted {
            version_id,
            format,
            artifact_path,
        } => match format.as_str() {
            "pdf" => {
                sqlx::query("UPDATE resume_versions SET pdf_path = $1 WHERE id = $2")
                    .bind(artifact_path)
                    .bind(version_id)
                    .execute(pool)
                    .await?;
                info!(version_id = %version_id, "PDF artifact recorded");
            }
            "docx" => {
                sqlx::query("UPDATE resume_versions SET docx_path = $1 WHERE id = $2")
                    .bind(artifact_path)
                    .bind(version_id)
                    .execute(pool)
                    .await?;
                info!(version_id = %version_id, "DOCX artifact recorded");
            }
            other => warn!(version_id = %version_id, "Ignoring render event with unknown format '{other}'"),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_extraction_job_payload_shape() {
        let job = ExtractionJob {
            document_id: Uuid::nil(),
            user_id: Uuid::nil(),
            file_path: "u/d/cert.pdf".to_string(),
        };
        let payload: Value = serde_json::to_value(&job).unwrap();
        assert_eq!(payload["file_path"], "u/d/cert.pdf");
        assert!(payload.get("document_id").is_some());
        assert!(payload.get("user_id").is_some());
    }

    #[test]
    fn test_event_tag_dispatch() {
        let payload = json!({
            "kind": "extraction_completed",
            "document_id": Uuid::nil(),
            "extracted_content": {"skills": ["rust"]}
        });
        let event: ProcessingEvent = serde_json::from_value(payload).unwrap();
        assert!(matches!(event, ProcessingEvent::ExtractionCompleted { .. }));
    }

    #[test]
    fn test_render_event_round_trip() {
        let event = ProcessingEvent::RenderCompleted {
            version_id: Uuid::nil(),
            format: "pdf".to_string(),
            artifact_path: "u/resume-v1.pdf".to_string(),
        };
        let payload = serde_json::to_string(&event).unwrap();
        let back: ProcessingEvent = serde_json::from_str(&payload).unwrap();
        assert!(matches!(back, ProcessingEvent::RenderCompleted { .. }));
    }

    #[test]
    fn test_unknown_event_kind_is_rejected() {
        let payload = json!({ "kind": "telemetry_ping" });
        assert!(serde_json::from_value::<ProcessingEvent>(payload).is_err());
    }
}
