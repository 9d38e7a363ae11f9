/// External collaborators: object storage and image label detection
pub mod blob_store;
pub mod label_detector;

pub use blob_store::S3BlobStore;
pub use label_detector::RekognitionLabelDetector;

use crate::error::AppError;
use crate::models::DetectedLabel;
use async_trait::async_trait;

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store an object and return its public URL. Fails with
    /// `AppError::Storage`.
    ///
    /// The access policy is not chosen per call: every object is written
    /// public-read, and the returned URL must be fetchable anonymously since
    /// it is handed to clients as the post's `image_url`.
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, AppError>;
}

#[async_trait]
pub trait LabelDetector: Send + Sync {
    /// Labels for an uploaded blob, confidence on a 0..100 scale.
    /// Fails with `AppError::Detection`.
    async fn detect(&self, key: &str) -> Result<Vec<DetectedLabel>, AppError>;
}
