/// Follow and like edge writes
///
/// A repeated follow or like is a `Conflict`. Removing an edge that does not
/// exist succeeds without doing anything.
use crate::error::AppError;
use crate::metrics::posting::GRAPH_EDGE_WRITES_TOTAL;
use crate::repository::SocialGraphStore;
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct SocialGraphGate {
    store: Arc<dyn SocialGraphStore>,
}

impl SocialGraphGate {
    pub fn new(store: Arc<dyn SocialGraphStore>) -> Self {
        Self { store }
    }

    pub async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), AppError> {
        if follower_id == followee_id {
            record("follow", "insert", "rejected");
            return Err(AppError::Validation("users cannot follow themselves".to_string()));
        }

        let inserted = self
            .store
            .insert_follow(follower_id, followee_id)
            .await
            .map_err(|e| {
                record("follow", "insert", "error");
                AppError::from(e)
            })?;

        if !inserted {
            record("follow", "insert", "conflict");
            return Err(AppError::Conflict(format!(
                "already following user {}",
                followee_id
            )));
        }

        record("follow", "insert", "created");
        debug!(follower_id = %follower_id, followee_id = %followee_id, "Follow created");
        Ok(())
    }

    pub async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<(), AppError> {
        let removed = self
            .store
            .delete_follow(follower_id, followee_id)
            .await
            .map_err(|e| {
                record("follow", "delete", "error");
                AppError::from(e)
            })?;

        record("follow", "delete", if removed { "deleted" } else { "noop" });
        Ok(())
    }

    pub async fn like(&self, user_id: Uuid, post_id: Uuid) -> Result<(), AppError> {
        let inserted = self
            .store
            .insert_like(user_id, post_id)
            .await
            .map_err(|e| {
                record("like", "insert", "error");
                AppError::from(e)
            })?;

        if !inserted {
            record("like", "insert", "conflict");
            return Err(AppError::Conflict(format!("post {} already liked", post_id)));
        }

        record("like", "insert", "created");
        debug!(user_id = %user_id, post_id = %post_id, "Like created");
        Ok(())
    }

    pub async fn unlike(&self, user_id: Uuid, post_id: Uuid) -> Result<(), AppError> {
        let removed = self
            .store
            .delete_like(user_id, post_id)
            .await
            .map_err(|e| {
                record("like", "delete", "error");
                AppError::from(e)
            })?;

        record("like", "delete", if removed { "deleted" } else { "noop" });
        Ok(())
    }
}

fn record(edge: &str, action: &str, outcome: &str) {
    GRAPH_EDGE_WRITES_TOTAL
        .with_label_values(&[edge, action, outcome])
        .inc();
}
