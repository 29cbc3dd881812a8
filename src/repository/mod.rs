use std::{future::Future, sync::Arc, time::Duration};

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, sqlite::SqlitePoolOptions};

use crate::{
    config::AppConfig,
    error::StoreError,
    models::{NewPost, Post, PostChanges},
};

mod logging;
mod postgres;
mod sqlite;

pub use logging::LoggedRepository;
pub use postgres::PostgresRepository;
pub use sqlite::SqliteRepository;

/// Repository Trait
///
/// The data-access contract over the single `posts` table. Handlers and the
/// validation middleware only ever see this trait, so the backend (Postgres,
/// SQLite, a test mock) is chosen at startup and injected through `AppState`.
///
/// `update` and `remove` report the number of affected rows; the HTTP layer
/// turns zero into a 404.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn list(&self) -> Result<Vec<Post>, StoreError>;
    async fn get_by_id(&self, id: i64) -> Result<Option<Post>, StoreError>;
    async fn create(&self, post: NewPost) -> Result<Post, StoreError>;
    async fn update(&self, id: i64, changes: PostChanges) -> Result<u64, StoreError>;
    async fn remove(&self, id: i64) -> Result<u64, StoreError>;
}

/// RepositoryState
///
/// The shared handle stored in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// SQL shared by both backends. `$n` placeholders are understood by Postgres and
/// by SQLite, and both support `RETURNING`.
pub(crate) mod sql {
    pub const LIST: &str = "SELECT id, title, contents FROM posts ORDER BY id";
    pub const GET_BY_ID: &str = "SELECT id, title, contents FROM posts WHERE id = $1";
    pub const CREATE: &str =
        "INSERT INTO posts (title, contents) VALUES ($1, $2) RETURNING id, title, contents";
    pub const UPDATE: &str = "UPDATE posts SET title = COALESCE($1, title), contents = COALESCE($2, contents) WHERE id = $3";
    pub const REMOVE: &str = "DELETE FROM posts WHERE id = $1";
}

/// with_timeout
///
/// Bounds a store call by `limit`. An expired call is dropped and reported as
/// `StoreError::Timeout`.
pub async fn with_timeout<T, F>(limit: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(limit)),
    }
}

/// connect
///
/// Opens a pool for `config.db_url` and returns the matching repository,
/// wrapped in `LoggedRepository` when query logging is enabled.
pub async fn connect(config: &AppConfig) -> Result<RepositoryState, StoreError> {
    let repo: RepositoryState = if config.db_url.starts_with("sqlite:") {
        let mut options = SqlitePoolOptions::new().max_connections(config.db_max_connections);
        // Every connection to an in-memory database opens a fresh, empty one.
        if is_in_memory(&config.db_url) {
            options = options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }
        let pool = options.connect(&config.db_url).await?;
        tracing::info!("connected to SQLite store");
        Arc::new(SqliteRepository::new(pool))
    } else {
        let pool = PgPoolOptions::new()
            .max_connections(config.db_max_connections)
            .connect(&config.db_url)
            .await?;
        tracing::info!("connected to Postgres store");
        Arc::new(PostgresRepository::new(pool))
    };

    if config.log_queries {
        tracing::info!("query logging enabled");
        return Ok(Arc::new(LoggedRepository::new(repo)));
    }
    Ok(repo)
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}
