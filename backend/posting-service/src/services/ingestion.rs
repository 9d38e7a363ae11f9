/// Post ingestion: upload, label detection, transactional persist
///
/// The blob upload precedes any database write and is not transactional with
/// it. If the post transaction fails after a successful upload the blob is
/// left behind; that is logged at warn and counted in
/// `posting_orphaned_blobs_total`.
///
/// Labels are resolved in name order so that concurrent ingestions lock
/// catalog rows in the same order. A transaction aborted by the database
/// (deadlock, serialization failure) or lost to an outage is re-run from the
/// start on a fresh transaction, a bounded number of times.
use crate::clients::{BlobStore, LabelDetector};
use crate::error::AppError;
use crate::metrics::posting::{
    LABEL_DETECTION_DEGRADED_TOTAL, ORPHANED_BLOBS_TOTAL, POST_INGESTIONS_TOTAL,
    POST_TRANSACTION_RETRIES_TOTAL,
};
use crate::models::{DetectedLabel, NewPost, Post, PostRow};
use crate::repository::{PostStore, PostWriteTx};
use crate::services::TagCatalog;
use chrono::{DateTime, SecondsFormat, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

/// Labels below this detector confidence are discarded
pub const MIN_LABEL_CONFIDENCE: f32 = 90.0;

const DEFAULT_CONTENT_TYPE: &str = "image/jpeg";

const MAX_PERSIST_ATTEMPTS: u32 = 3;
const PERSIST_INITIAL_BACKOFF: Duration = Duration::from_millis(20);

pub struct PostIngestionService {
    store: Arc<dyn PostStore>,
    blobs: Arc<dyn BlobStore>,
    detector: Arc<dyn LabelDetector>,
    tags: TagCatalog,
    call_timeout: Duration,
}

impl PostIngestionService {
    pub fn new(
        store: Arc<dyn PostStore>,
        blobs: Arc<dyn BlobStore>,
        detector: Arc<dyn LabelDetector>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            store,
            blobs,
            detector,
            tags: TagCatalog::default(),
            call_timeout,
        }
    }

    /// Create a post from an uploaded image
    pub async fn ingest(
        &self,
        owner_id: Uuid,
        image: Vec<u8>,
        content_type: &str,
        content: &str,
    ) -> Result<Post, AppError> {
        let result = self.ingest_inner(owner_id, image, content_type, content).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(e) => e.kind(),
        };
        POST_INGESTIONS_TOTAL.with_label_values(&[outcome]).inc();

        result
    }

    async fn ingest_inner(
        &self,
        owner_id: Uuid,
        image: Vec<u8>,
        content_type: &str,
        content: &str,
    ) -> Result<Post, AppError> {
        if image.is_empty() {
            return Err(AppError::Validation("image is required".to_string()));
        }

        let content_type = match content_type.trim() {
            "" => DEFAULT_CONTENT_TYPE,
            ct => ct,
        };
        let key = storage_key(Utc::now(), owner_id);

        let image_url =
            match tokio::time::timeout(self.call_timeout, self.blobs.put(&key, image, content_type))
                .await
            {
                Ok(result) => result?,
                Err(_) => {
                    return Err(AppError::Storage(format!(
                        "image upload timed out after {}ms",
                        self.call_timeout.as_millis()
                    )))
                }
            };

        let labels = self.detect_labels(&key).await;

        let new_post = NewPost {
            id: Uuid::new_v4(),
            user_id: owner_id,
            image_url,
            content: content.to_string(),
        };

        let row = match self.persist(&new_post, &labels).await {
            Ok(row) => row,
            Err(e) => {
                ORPHANED_BLOBS_TOTAL.inc();
                warn!(
                    storage_key = %key,
                    user_id = %owner_id,
                    error = %e,
                    "Post transaction failed after upload; blob left without a post"
                );
                return Err(e);
            }
        };

        info!(
            post_id = %row.id,
            user_id = %owner_id,
            storage_key = %key,
            tag_count = labels.len(),
            "Post ingested"
        );

        Ok(Post::from(row))
    }

    /// Above-threshold label names; detector failure yields none
    async fn detect_labels(&self, key: &str) -> Vec<String> {
        match tokio::time::timeout(self.call_timeout, self.detector.detect(key)).await {
            Ok(Ok(labels)) => filter_labels(&labels),
            Ok(Err(e)) => {
                LABEL_DETECTION_DEGRADED_TOTAL
                    .with_label_values(&["error"])
                    .inc();
                warn!(
                    storage_key = %key,
                    error = %e,
                    "Label detection failed; posting without tags"
                );
                Vec::new()
            }
            Err(_) => {
                LABEL_DETECTION_DEGRADED_TOTAL
                    .with_label_values(&["timeout"])
                    .inc();
                warn!(
                    storage_key = %key,
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "Label detection timed out; posting without tags"
                );
                Vec::new()
            }
        }
    }

    async fn persist(&self, post: &NewPost, labels: &[String]) -> Result<PostRow, AppError> {
        let mut backoff = PERSIST_INITIAL_BACKOFF;
        let mut attempt = 1;

        loop {
            match self.persist_once(post, labels).await {
                Err(AppError::StoreUnavailable(msg)) if attempt < MAX_PERSIST_ATTEMPTS => {
                    POST_TRANSACTION_RETRIES_TOTAL.inc();
                    warn!(
                        post_id = %post.id,
                        attempt,
                        max_attempts = MAX_PERSIST_ATTEMPTS,
                        error = %msg,
                        "Post transaction failed, retrying on a fresh transaction"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff *= 2;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    async fn persist_once(&self, post: &NewPost, labels: &[String]) -> Result<PostRow, AppError> {
        let mut tx = self.store.begin().await?;

        match self.write_post(tx.as_mut(), post, labels).await {
            Ok(row) => {
                tx.commit().await?;
                Ok(row)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback of post transaction failed");
                }
                Err(e)
            }
        }
    }

    async fn write_post(
        &self,
        tx: &mut dyn PostWriteTx,
        post: &NewPost,
        labels: &[String],
    ) -> Result<PostRow, AppError> {
        let row = tx.insert_post(post).await?;

        for label in labels {
            let tag_id = self.tags.resolve(&mut *tx, label).await?;
            tx.link_tag(row.id, tag_id).await?;
        }

        Ok(row)
    }
}

/// Blob key from upload time and owner, e.g. `2024-03-01T12_30_05.123456Z_<uuid>.jpg`
pub fn storage_key(at: DateTime<Utc>, owner_id: Uuid) -> String {
    format!(
        "{}_{}.jpg",
        at.to_rfc3339_opts(SecondsFormat::Micros, true)
            .replace(':', "_"),
        owner_id
    )
}

/// Normalized names of labels at or above `MIN_LABEL_CONFIDENCE`, sorted,
/// duplicates removed
pub fn filter_labels(labels: &[DetectedLabel]) -> Vec<String> {
    let mut kept: Vec<String> = Vec::new();

    for label in labels {
        if label.confidence.is_nan() || label.confidence < MIN_LABEL_CONFIDENCE {
            continue;
        }
        if let Some(name) = TagCatalog::normalize(&label.name) {
            kept.push(name);
        }
    }

    kept.sort();
    kept.dedup();
    kept
}
