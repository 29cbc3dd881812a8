use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};

use crate::{
    AppState,
    error::{ApiError, METHOD_NOT_ALLOWED, ROUTE_NOT_FOUND},
    models::{CreatePostRequest, ErrorBody, Post, UpdatePostRequest},
    repository::with_timeout,
    validation::{FoundPost, PostId, ValidJson},
};

pub const LIST_FAILED: &str = "The posts information could not be retrieved.";
pub const CREATE_FAILED: &str = "There was an error while saving the post to the database.";
pub const UPDATE_FAILED: &str = "The post information could not be modified.";
pub const REMOVE_FAILED: &str = "The post could not be removed.";

// --- Handlers ---

/// list_posts
///
/// Returns every stored post, ordered by id.
#[utoipa::path(
    get,
    path = "/posts",
    responses(
        (status = 200, description = "All posts", body = [Post]),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, ApiError> {
    let posts = with_timeout(state.config.store_timeout, state.repo.list())
        .await
        .map_err(|e| ApiError::internal(LIST_FAILED, e))?;
    Ok(Json(posts))
}

/// get_post
///
/// Returns the post resolved by `require_existing_post`. Missing ids and store
/// failures were already answered by the middleware.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = Post),
        (status = 400, description = "Malformed ID", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody)
    )
)]
pub async fn get_post(Extension(FoundPost(post)): Extension<FoundPost>) -> Json<Post> {
    Json(post)
}

/// create_post
///
/// Inserts a post. The body has already passed the strict policy, so both
/// fields are present by the time the store is called.
#[utoipa::path(
    post,
    path = "/posts",
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Created", body = Post),
        (status = 400, description = "Missing title or contents", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn create_post(
    State(state): State<AppState>,
    ValidJson(new_post): ValidJson<CreatePostRequest>,
) -> Result<(StatusCode, Json<Post>), ApiError> {
    let post = with_timeout(state.config.store_timeout, state.repo.create(new_post))
        .await
        .map_err(|e| ApiError::internal(CREATE_FAILED, e))?;
    tracing::debug!(post_id = post.id, "post created");
    Ok((StatusCode::CREATED, Json(post)))
}

/// update_post
///
/// Applies a partial update. Existence is decided by the affected-row count, not
/// by a pre-lookup; the row is then read back so the client gets the merged post.
#[utoipa::path(
    put,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 400, description = "Empty update", body = ErrorBody),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn update_post(
    State(state): State<AppState>,
    PostId(id): PostId,
    ValidJson(changes): ValidJson<UpdatePostRequest>,
) -> Result<Json<Post>, ApiError> {
    let limit = state.config.store_timeout;

    let affected = with_timeout(limit, state.repo.update(id, changes))
        .await
        .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?;
    if affected == 0 {
        return Err(ApiError::post_not_found());
    }

    // A concurrent delete between the two calls also ends up as 404.
    let post = with_timeout(limit, state.repo.get_by_id(id))
        .await
        .map_err(|e| ApiError::internal(UPDATE_FAILED, e))?
        .ok_or_else(ApiError::post_not_found)?;
    Ok(Json(post))
}

/// delete_post
///
/// Removes a post. Zero affected rows means the id did not exist.
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not Found", body = ErrorBody),
        (status = 500, description = "Store failure", body = ErrorBody)
    )
)]
pub async fn delete_post(
    State(state): State<AppState>,
    PostId(id): PostId,
) -> Result<StatusCode, ApiError> {
    let affected = with_timeout(state.config.store_timeout, state.repo.remove(id))
        .await
        .map_err(|e| ApiError::internal(REMOVE_FAILED, e))?;

    match affected {
        0 => Err(ApiError::post_not_found()),
        _ => Ok(StatusCode::NO_CONTENT),
    }
}

/// Fallback for unmatched paths, so they share the JSON error shape.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound(ROUTE_NOT_FOUND.to_string())
}

/// Fallback for a known path hit with a method it does not serve.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed(METHOD_NOT_ALLOWED.to_string())
}
