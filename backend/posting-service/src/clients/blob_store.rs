use super::BlobStore;
use crate::error::AppError;
use async_trait::async_trait;
use s3_utils::S3Operations;

/// Blob store backed by a public-read S3 bucket
#[derive(Clone)]
pub struct S3BlobStore {
    s3: S3Operations,
}

impl S3BlobStore {
    pub fn new(s3: S3Operations) -> Self {
        Self { s3 }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError> {
        self.s3
            .put_public_object(key, bytes, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Image upload failed: {}", e)))
    }
}
