use async_trait::async_trait;
use sqlx::SqlitePool;

use super::{Repository, sql};
use crate::{
    error::StoreError,
    models::{NewPost, Post, PostChanges},
};

/// SqliteRepository
///
/// `Repository` backed by SQLite, for single-file deployments and the test suite.
/// Expects `posts (id INTEGER PRIMARY KEY AUTOINCREMENT, title TEXT NOT NULL,
/// contents TEXT NOT NULL)`.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        Ok(sqlx::query_as::<_, Post>(sql::LIST)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>, StoreError> {
        Ok(sqlx::query_as::<_, Post>(sql::GET_BY_ID)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        Ok(sqlx::query_as::<_, Post>(sql::CREATE)
            .bind(post.title)
            .bind(post.contents)
            .fetch_one(&self.pool)
            .await?)
    }

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
