use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::document::BlobState;
use crate::storage::ObjectStore;

/// How long a staged row may sit before the sweep assumes its upload died.
const STAGED_CUTOFF_MINUTES: i64 = 60;

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub staged_cleared: usize,
    pub removing_cleared: usize,
}

/// Background loop finishing interrupted upload/delete sagas.
pub async fn run_sweeper(
    pool: PgPool,
    store: Arc<dyn ObjectStore>,
    bucket: String,
    interval_secs: u64,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    loop {
        ticker.tick().await;
        match sweep_once(&pool, store.as_ref(), &bucket).await {
            Ok(report) if report.staged_cleared + report.removing_cleared > 0 => {
                info!(
                    "Sweep cleared {} staged and {} removing documents",
                    report.staged_cleared, report.removing_cleared
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Document sweep failed: {e}"),
        }
    }
}

/// One sweep pass.
///
/// Staged rows older than the cutoff never had their blob write confirmed:
/// remove any half-written blob (missing is fine), then the row. Removing
/// rows already lost their blob: delete the row. A blob-removal failure
/// skips that row so the next pass retries it.
pub async fn sweep_once(
    pool: &PgPool,
    store: &dyn ObjectStore,
    bucket: &str,
) -> Result<SweepReport, sqlx::Error> {
    let mut report = SweepReport::default();
    let cutoff = Utc::now() - chrono::Duration::minutes(STAGED_CUTOFF_MINUTES);

    let staged: Vec<(Uuid, String)> = sqlx::query_as(
        "SELECT id, file_path FROM documents WHERE blob_state = $1 AND created_at < $2",
    )
    .bind(BlobState::Staged.as_str())
    .bind(cutoff)
    .fetch_all(pool)
    .await?;

    for (id, file_path) in staged {
        if let Err(e) = store.remove(bucket, &file_path).await {
            warn!("Sweep could not remove staged blob {file_path}: {e}");
            continue;
        }
        sqlx::query("DELETE FROM documents WHERE id = $1 AND blob_state = $2")
            .bind(id)
            .bind(BlobState::Staged.as_str())
            .execute(pool)
            .await?;
        report.staged_cleared += 1;
    }

    let removing: Vec<(Uuid, String)> =
        sqlx::query_as("SELECT id, file_path FROM documents WHERE blob_state = $1")
            .bind(BlobState::Removing.as_str())
            .fetch_all(pool)
            .await?;

    for (id, file_path) in removing {
        if let Err(e) = store.remove(bucket, &file_path).await {
            warn!("Sweep could not remove blob {file_path}: {e}");
            continue;
        }
        sqlx::query("DELETE FROM documents WHERE id = $1 AND blob_state = $2")
            .bind(id)
            .bind(BlobState::Removing.as_str())
            .execute(pool)
            .await?;
        report.removing_cleared += 1;
    }

    Ok(report)
}
