//! Router Module Index
//!
//! Splits the route table by concern. Each module returns a `Router<AppState>`
//! that `create_router` merges and finishes with state and the outer layers.

/// The `/posts` resource, including its route-scoped validation middleware.
pub mod posts;

/// Liveness probe.
pub mod health;
