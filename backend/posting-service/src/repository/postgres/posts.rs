use super::PostgresStore;
use crate::models::{NewPost, PostRow};
use crate::repository::{PostStore, PostWriteTx, StoreError};
use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

/// Ingestion transaction on a pooled connection
pub struct PgPostWriteTx {
    pub(super) tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl PostWriteTx for PgPostWriteTx {
    async fn insert_post(&mut self, post: &NewPost) -> Result<PostRow, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            INSERT INTO posts (id, user_id, image_url, content, created_at)
            VALUES ($1, $2, $3, $4, NOW())
            RETURNING id, user_id, image_url, content, created_at, updated_at
            "#,
        )
        .bind(post.id)
        .bind(post.user_id)
        .bind(&post.image_url)
        .bind(&post.content)
        .fetch_one(&mut *self.tx)
        .await?;

        Ok(row)
    }

    async fn link_tag(&mut self, post_id: Uuid, tag_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO post_tags (post_id, tag_id)
            VALUES ($1, $2)
            "#,
        )
        .bind(post_id)
        .bind(tag_id)
        .execute(&mut *self.tx)
        .await?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), StoreError> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[async_trait]
impl PostStore for PostgresStore {
    async fn begin(&self) -> Result<Box<dyn PostWriteTx>, StoreError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgPostWriteTx { tx }))
    }

    async fn update_post_content(
        &self,
        owner_id: Uuid,
        post_id: Uuid,
        content: &str,
    ) -> Result<Option<PostRow>, StoreError> {
        let row = sqlx::query_as::<_, PostRow>(
            r#"
            UPDATE posts
            SET content = $3, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, image_url, content, created_at, updated_at
            "#,
        )
        .bind(post_id)
        .bind(owner_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn delete_post_cascade(
        &self,
        owner_id: Uuid,
        post_id: Uuid,
    ) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Row lock keeps concurrent likes/links from slipping in before the delete
        let locked = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM posts WHERE id = $1 AND user_id = $2 FOR UPDATE",
        )
        .bind(post_id)
        .bind(owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        if locked.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        let tags_removed = sqlx::query("DELETE FROM post_tags WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let likes_removed = sqlx::query("DELETE FROM likes WHERE post_id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            post_id = %post_id,
            tags_removed,
            likes_removed,
            "Deleted post with its tag links and likes"
        );

        Ok(true)
    }
}
