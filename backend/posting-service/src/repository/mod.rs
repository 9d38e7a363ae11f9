/// Storage ports for posting-service
///
/// Services depend on these traits only. `postgres` holds the production
/// implementation on top of a sqlx `PgPool`.
pub mod postgres;

pub use postgres::PostgresStore;

use crate::models::{FeedRow, NewPost, PageRequest, PostRow};
use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

const DEADLOCK_DETECTED: &str = "40P01";
const SERIALIZATION_FAILURE: &str = "40001";

#[derive(Debug, Error)]
pub enum StoreError {
    /// Pool timeout, closed pool or connection loss
    #[error("{0}")]
    Unavailable(String),

    /// Deadlock or serialization failure; the transaction is aborted and
    /// may succeed if run again from the start
    #[error("{0}")]
    TransactionAborted(String),

    #[error("{0}")]
    UniqueViolation(String),

    #[error("{0}")]
    ForeignKeyViolation(String),

    #[error("{0}")]
    Query(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::Io(_)
            | sqlx::Error::WorkerCrashed => StoreError::Unavailable(err.to_string()),
            sqlx::Error::Database(db_err)
                if matches!(
                    db_err.code().as_deref(),
                    Some(DEADLOCK_DETECTED | SERIALIZATION_FAILURE)
                ) =>
            {
                StoreError::TransactionAborted(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                StoreError::ForeignKeyViolation(db_err.message().to_string())
            }
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Tag lookups and inserts, scoped to an open transaction
#[async_trait]
pub trait TagStore: Send {
    async fn find_tag_id(&mut self, name: &str) -> Result<Option<Uuid>, StoreError>;

    /// Insert a tag; `None` when the name is already taken
    async fn insert_tag(&mut self, name: &str) -> Result<Option<Uuid>, StoreError>;
}

/// One open write transaction. Dropping it without `commit` rolls back.
#[async_trait]
pub trait PostWriteTx: TagStore {
    async fn insert_post(&mut self, post: &NewPost) -> Result<PostRow, StoreError>;

    async fn link_tag(&mut self, post_id: Uuid, tag_id: Uuid) -> Result<(), StoreError>;

    async fn commit(self: Box<Self>) -> Result<(), StoreError>;

    async fn rollback(self: Box<Self>) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PostStore: Send + Sync {
    async fn begin(&self) -> Result<Box<dyn PostWriteTx>, StoreError>;

    /// Update the text of a post owned by `owner_id`; `None` if no such post
    async fn update_post_content(
        &self,
        owner_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Option<PostRow>, StoreError>;

    /// Delete an owned post with its tag links and likes in one transaction.
    /// Returns false if no such post.
    async fn delete_post_cascade(&self, owner_id: Uuid, post_id: Uuid)
        -> Result<bool, StoreError>;
}

#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Posts of one owner, oldest first
    async fn posts_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<PostRow>, StoreError>;

    /// Posts of everyone `viewer_id` follows, newest first
    async fn followed_feed(
        &self,
        viewer_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<FeedRow>, StoreError>;

    async fn post_detail(
        &self,
        viewer_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<FeedRow>, StoreError>;

    /// Tag names of a post, alphabetical
    async fn post_tag_names(&self, post_id: Uuid) -> Result<Vec<String>, StoreError>;
}

/// Follow and like edges. Inserts return false when the edge already
/// exists; deletes return false when there was nothing to delete.
#[async_trait]
pub trait SocialGraphStore: Send + Sync {
    async fn insert_follow(&self, follower_id: Uuid, followee_id: Uuid)
        -> Result<bool, StoreError>;

    async fn delete_follow(&self, follower_id: Uuid, followee_id: Uuid)
        -> Result<bool, StoreError>;

    async fn insert_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, StoreError>;

    async fn delete_like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_map_to_unavailable() {
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            StoreError::from(sqlx::Error::PoolClosed),
            StoreError::Unavailable(_)
        ));
    }

    #[test]
    fn test_other_errors_map_to_query() {
        assert!(matches!(
            StoreError::from(sqlx::Error::RowNotFound),
            StoreError::Query(_)
        ));
    }
}
