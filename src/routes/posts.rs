use crate::{AppState, handlers, validation::require_existing_post};
use axum::{
    Router, middleware,
    routing::{get, put},
};

/// Posts Router
///
/// The five CRUD routes over the `posts` table.
///
/// Not-found handling is decided per route and never doubled up:
/// - `GET /posts/{id}` runs `require_existing_post`, which answers 404 before the
///   handler and hands the found row over in the request extensions.
/// - `PUT` and `DELETE /posts/{id}` skip the lookup and answer 404 from the
///   affected-row count reported by the store.
///
/// Body validation happens in the `ValidJson` extractor of the create and update
/// handlers (strict for create, permissive for update).
pub fn post_routes(state: &AppState) -> Router<AppState> {
    // `route_layer` only wraps the methods registered before it, so the lookup
    // router and the write router are built apart and merged for the one path.
    let lookup = get(handlers::get_post).route_layer(middleware::from_fn_with_state(
        state.clone(),
        require_existing_post,
    ));
    let writes = put(handlers::update_post).delete(handlers::delete_post);

    Router::new()
        // GET /posts, POST /posts
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        // GET /posts/{id} (with lookup), PUT /posts/{id}, DELETE /posts/{id}
        .route("/posts/{id}", lookup.merge(writes))
}
