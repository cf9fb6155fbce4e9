use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Blob-store seam. Production uses S3/MinIO; tests use the in-memory store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError>;

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError>;

    /// Removing a key that does not exist is not an error.
    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError>;
}

pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
}

impl S3ObjectStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(e.to_string())
                }
            })?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(data.into_bytes())
    }

    async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
        // S3 DeleteObject succeeds on a missing key, which matches the
        // trait contract.
        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
pub use memory::MemoryObjectStore;

#[cfg(test)]
mod memory {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory store for tests. Call counters and failure switches let
    /// tests assert which operations ran and exercise compensation paths.
    #[derive(Default)]
    pub struct MemoryObjectStore {
        objects: Mutex<HashMap<(String, String), Bytes>>,
        pub fail_puts: AtomicBool,
        pub fail_removes: AtomicBool,
        pub get_calls: AtomicUsize,
        pub put_calls: AtomicUsize,
        pub remove_calls: AtomicUsize,
    }

    impl MemoryObjectStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn contains(&self, bucket: &str, key: &str) -> bool {
            self.objects
                .lock()
                .unwrap()
                .contains_key(&(bucket.to_string(), key.to_string()))
        }

        pub fn insert(&self, bucket: &str, key: &str, bytes: Bytes) {
            self.objects
                .lock()
                .unwrap()
                .insert((bucket.to_string(), key.to_string()), bytes);
        }
    }

    #[async_trait]
    impl ObjectStore for MemoryObjectStore {
        async fn put(
            &self,
            bucket: &str,
            key: &str,
            bytes: Bytes,
            _content_type: &str,
        ) -> Result<(), StorageError> {
            self.put_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_puts.load(Ordering::SeqCst) {
                return Err(StorageError::Backend("simulated put failure".to_string()));
            }
            self.insert(bucket, key, bytes);
            Ok(())
        }

        async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StorageError> {
            self.get_calls.fetch_add(1, Ordering::SeqCst);
            self.objects
                .lock()
                .unwrap()
                .get(&(bucket.to_string(), key.to_string()))
                .cloned()
                .ok_or_else(|| StorageError::NotFound(key.to_string()))
        }

        async fn remove(&self, bucket: &str, key: &str) -> Result<(), StorageError> {
            self.remove_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_removes.load(Ordering::SeqCst) {
                return Err(StorageError::Backend("simulated remove failure".to_string()));
            }
            self.objects
                .lock()
                .unwrap()
                .remove(&(bucket.to_string(), key.to_string()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let store = MemoryObjectStore::new();
        store
            .put("documents", "u1/d1/cert.pdf", Bytes::from_static(b"pdf"), "application/pdf")
            .await
            .unwrap();
        let bytes = store.get("documents", "u1/d1/cert.pdf").await.unwrap();
        assert_eq!(bytes, Bytes::from_static(b"pdf"));
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let store = MemoryObjectStore::new();
        let err = store.get("documents", "u1/nope.pdf").await.unwrap_err();
        assert!(matches!(err, StorageError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_missing_is_ok() {
        let store = MemoryObjectStore::new();
        assert!(store.remove("documents", "u1/nope.pdf").await.is_ok());
    }
}
