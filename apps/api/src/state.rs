use std::sync::Arc;

use redis::Client as RedisClient;
use sqlx::PgPool;

use crate::config::Config;
use crate::storage::ObjectStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Redis client backing the extraction/render job queue.
    pub redis: RedisClient,
    /// Pluggable blob store. S3/MinIO in production, in-memory in tests.
    pub store: Arc<dyn ObjectStore>,
    pub config: Config,
}
