use super::PostgresStore;
use crate::models::{FeedRow, PageRequest, PostRow};
use crate::repository::{FeedStore, StoreError};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl FeedStore for PostgresStore {
    async fn posts_by_owner(
        &self,
        owner_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<PostRow>, StoreError> {
        let rows = sqlx::query_as::<_, PostRow>(
            r#"
            SELECT id, user_id, image_url, content, created_at, updated_at
            FROM posts
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(owner_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn followed_feed(
        &self,
        viewer_id: Uuid,
        page: PageRequest,
    ) -> Result<Vec<FeedRow>, StoreError> {
        // l counts every like; l2 only matches the viewer's own like
        let rows = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT p.id, p.user_id, u.email, p.image_url, p.content, p.created_at,
                   COUNT(DISTINCT l.user_id) AS like_cnt,
                   COUNT(l2.user_id) > 0 AS is_liked
            FROM follows f
            JOIN posts p ON p.user_id = f.followee_id
            JOIN users u ON u.id = p.user_id
            LEFT JOIN likes l ON l.post_id = p.id
            LEFT JOIN likes l2 ON l2.post_id = p.id AND l2.user_id = $1
            WHERE f.follower_id = $1
            GROUP BY p.id, u.id
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(viewer_id)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn post_detail(
        &self,
        viewer_id: Uuid,
        post_id: Uuid,
    ) -> Result<Option<FeedRow>, StoreError> {
        let row = sqlx::query_as::<_, FeedRow>(
            r#"
            SELECT p.id, p.user_id, u.email, p.image_url, p.content, p.created_at,
                   COUNT(DISTINCT l.user_id) AS like_cnt,
                   COUNT(l2.user_id) > 0 AS is_liked
            FROM posts p
            JOIN users u ON u.id = p.user_id
            LEFT JOIN likes l ON l.post_id = p.id
            LEFT JOIN likes l2 ON l2.post_id = p.id AND l2.user_id = $1
            WHERE p.id = $2
            GROUP BY p.id, u.id
            "#,
        )
        .bind(viewer_id)
        .bind(post_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn post_tag_names(&self, post_id: Uuid) -> Result<Vec<String>, StoreError> {
        let names = sqlx::query_scalar::<_, String>(
            r#"
            SELECT t.name
            FROM post_tags pt
            JOIN tags t ON t.id = pt.tag_id
            WHERE pt.post_id = $1
            ORDER BY t.name
            "#,
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }
}
