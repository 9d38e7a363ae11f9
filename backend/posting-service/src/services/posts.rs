/// Owner-only edits of existing posts
use crate::error::AppError;
use crate::models::Post;
use crate::repository::PostStore;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    store: Arc<dyn PostStore>,
}

impl PostService {
    pub fn new(store: Arc<dyn PostStore>) -> Self {
        Self { store }
    }

    /// Replace the text of a post. Posts of other users are reported as not found.
    pub async fn update_content(
        &self,
        owner_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Post, AppError> {
        let row = self
            .store
            .update_post_content(owner_id, post_id, content)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        Ok(Post::from(row))
    }

    /// Delete a post together with its tag links and likes.
    /// The image blob stays in the bucket.
    pub async fn delete_post(&self, owner_id: Uuid, post_id: Uuid) -> Result<(), AppError> {
        if !self.store.delete_post_cascade(owner_id, post_id).await? {
            return Err(AppError::NotFound(format!("post {}", post_id)));
        }

        info!(post_id = %post_id, user_id = %owner_id, "Post deleted");
        Ok(())
    }
}
