/// Read side: own posts, followed-users feed, post detail
use crate::error::AppError;
use crate::models::{FeedItem, Page, PageRequest, Post, PostDetail};
use crate::repository::FeedStore;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct FeedQueryService {
    store: Arc<dyn FeedStore>,
}

impl FeedQueryService {
    pub fn new(store: Arc<dyn FeedStore>) -> Self {
        Self { store }
    }

    /// Posts owned by `user_id`, oldest first
    pub async fn get_own_posts(
        &self,
        user_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<Post>, AppError> {
        let rows = self.store.posts_by_owner(user_id, page).await?;
        Ok(Page::new(rows.into_iter().map(Post::from).collect(), page))
    }

    /// Posts by everyone `viewer_id` follows, newest first, with like aggregates
    pub async fn get_followed_feed(
        &self,
        viewer_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<FeedItem>, AppError> {
        let rows = self.store.followed_feed(viewer_id, page).await?;
        Ok(Page::new(rows.into_iter().map(FeedItem::from).collect(), page))
    }

    pub async fn get_post_detail(
        &self,
        viewer_id: Uuid,
        post_id: Uuid,
    ) -> Result<PostDetail, AppError> {
        let row = self
            .store
            .post_detail(viewer_id, post_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("post {}", post_id)))?;

        let tags = self.store.post_tag_names(post_id).await?;

        Ok(PostDetail::from_parts(row, tags))
    }
}
