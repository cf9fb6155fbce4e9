use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    /// Bucket holding raw user uploads, keys prefixed by user id.
    pub documents_bucket: String,
    /// Bucket holding generated PDF/DOCX export artifacts.
    pub exports_bucket: String,
    pub jwt_secret: String,
    pub jwt_maxage_secs: i64,
    pub sweep_interval_secs: u64,
    pub event_poll_interval_secs: u64,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            redis_url: require_env("REDIS_URL")?,
            s3_endpoint: require_env("S3_ENDPOINT")?,
            aws_access_key_id: require_env("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require_env("AWS_SECRET_ACCESS_KEY")?,
            documents_bucket: require_env("DOCUMENTS_BUCKET")?,
            exports_bucket: require_env("EXPORTS_BUCKET")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_maxage_secs: env_or("JWT_MAXAGE_SECS", "86400")
                .parse::<i64>()
                .context("JWT_MAXAGE_SECS must be a number of seconds")?,
            sweep_interval_secs: env_or("SWEEP_INTERVAL_SECS", "900")
                .parse::<u64>()
                .context("SWEEP_INTERVAL_SECS must be a number of seconds")?,
            event_poll_interval_secs: env_or("EVENT_POLL_INTERVAL_SECS", "5")
                .parse::<u64>()
                .context("EVENT_POLL_INTERVAL_SECS must be a number of seconds")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
