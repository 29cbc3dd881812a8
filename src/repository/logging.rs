use std::{fmt::Debug, time::Instant};

use async_trait::async_trait;

use super::{Repository, RepositoryState, sql};
use crate::{
    error::StoreError,
    models::{NewPost, Post, PostChanges},
};

/// LoggedRepository
///
/// Decorator that emits one `tracing` event per store query: the operation, its
/// SQL text, bound arguments, elapsed time and outcome. Installed by
/// `repository::connect` only when `LOG_QUERIES` is on.
pub struct LoggedRepository {
    inner: RepositoryState,
}

impl LoggedRepository {
    pub fn new(inner: RepositoryState) -> Self {
        Self { inner }
    }
}

fn log_query<T>(
    op: &'static str,
    sql: &'static str,
    args: &dyn Debug,
    started: Instant,
    result: &Result<T, StoreError>,
) {
    let elapsed_ms = started.elapsed().as_secs_f64() * 1_000.0;
    match result {
        Ok(_) => tracing::info!(target: "posts_api::query", op, sql, ?args, elapsed_ms, "query ok"),
        Err(e) => {
            tracing::warn!(target: "posts_api::query", op, sql, ?args, elapsed_ms, error = %e, "query failed")
        }
    }
}

#[async_trait]
impl Repository for LoggedRepository {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        let started = Instant::now();
        let result = self.inner.list().await;
        log_query("list", sql::LIST, &(), started, &result);
        result
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Post>, StoreError> {
        let started = Instant::now();
        let result = self.inner.get_by_id(id).await;
        log_query("get_by_id", sql::GET_BY_ID, &(id,), started, &result);
        result
    }

    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        let args = (post.title.clone(), post.contents.clone());
        let started = Instant::now();
        let result = self.inner.create(post).await;
        log_query("create", sql::CREATE, &args, started, &result);
        result
    }

    async fn update(&self, id: i64, changes: PostChanges) -> Result<u64, StoreError> {
        let args = (changes.title.clone(), changes.contents.clone(), id);
        let started = Instant::now();
        let result = self.inner.update(id, changes).await;
        log_query("update", sql::UPDATE, &args, started, &result);
        result
    }

    async fn remove(&self, id: i64) -> Result<u64, StoreError> {
        let started = Instant::now();
        let result = self.inner.remove(id).await;
        log_query("remove", sql::REMOVE, &(id,), started, &result);
        result
    }
}
