use async_trait::async_trait;
use sqlx::PgPool;

use super::{Repository, sql};
use crate::{
    error::StoreError,
    models::{NewPost, Post, PostChanges},
};

/// PostgresRepository
///
/// `Repository` backed by a PostgreSQL connection pool. Expects
/// `posts (id BIGSERIAL PRIMARY KEY, title TEXT NOT NULL, contents TEXT NOT NULL)`.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let posts = sqlx::query_as::<_, Post>(sql::LIST)
            .fetch_all(&self.pool)
            .await?;
        Ok(posts)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let post = sqlx::query_as::<_, Post>(sql::GET_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let created = sqlx::query_as::<_, Post>(sql::CREATE)
            .bind(post.title)
            .bind(post.contents)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Partial update: `COALESCE` keeps the stored value for every field that is
    /// `None` in `changes`.
    async fn update(&self, id: i64, changes: PostChanges) -> Result<u64, StoreError> {
        let result = sqlx::query(sql::UPDATE)
            .bind(changes.title)
            .bind(changes.contents)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn remove(&self, id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query(sql::REMOVE)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
