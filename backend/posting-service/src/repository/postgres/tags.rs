use super::PgPostWriteTx;
use crate::repository::{StoreError, TagStore};
use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
impl TagStore for PgPostWriteTx {
    async fn find_tag_id(&mut self, name: &str) -> Result<Option<Uuid>, StoreError> {
        let id = sqlx::query_scalar::<_, Uuid>("SELECT id FROM tags WHERE name = $1")
            .bind(name)
            .fetch_optional(&mut *self.tx)
            .await?;

        Ok(id)
    }

    async fn insert_tag(&mut self, name: &str) -> Result<Option<Uuid>, StoreError> {
        // DO NOTHING instead of a raised unique violation, which would abort the
        // surrounding transaction
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO tags (id, name)
            VALUES ($1, $2)
            ON CONFLICT (name) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .fetch_optional(&mut *self.tx)
        .await?;

        Ok(id)
    }
}
