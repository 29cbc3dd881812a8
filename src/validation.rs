use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Path, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use serde::de::DeserializeOwned;

use crate::{
    AppState,
    error::ApiError,
    models::{CreatePostRequest, NewPost, Post, PostChanges, UpdatePostRequest},
    repository::with_timeout,
};

pub const MISSING_BOTH_FIELDS: &str = "Please provide title and contents for the post.";
pub const MISSING_ANY_FIELD: &str = "Please provide title or contents for the post.";
pub const INVALID_POST_ID: &str = "The post ID must be an integer.";
pub const LOOKUP_FAILED: &str = "The post information could not be retrieved.";

// --- Identifier Check ---

/// PostId
///
/// The `{id}` path segment parsed as an integer. Rejects with a 400 `ApiError`
/// so that a malformed id is formatted like every other error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostId(pub i64);

impl<S> FromRequestParts<S> for PostId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i64>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest(INVALID_POST_ID.to_string()))?;
        Ok(PostId(id))
    }
}

/// FoundPost
///
/// The row resolved by `require_existing_post`, handed to the handler through the
/// request extensions so it does not query the store a second time.
#[derive(Debug, Clone)]
pub struct FoundPost(pub Post);

/// require_existing_post
///
/// Route middleware for `GET /posts/{id}`. Looks the post up once; a missing row
/// short-circuits with 404 and the handler never runs, a failed lookup
/// short-circuits with 500.
pub async fn require_existing_post(
    State(state): State<AppState>,
    PostId(id): PostId,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let post = with_timeout(state.config.store_timeout, state.repo.get_by_id(id))
        .await
        .map_err(|e| ApiError::internal(LOOKUP_FAILED, e))?
        .ok_or_else(ApiError::post_not_found)?;

    request.extensions_mut().insert(FoundPost(post));
    Ok(next.run(request).await)
}

// --- Payload Check ---

/// Validate
///
/// A request body's presence policy. `validate` consumes the raw payload and
/// produces the type the repository accepts, so an unchecked body cannot reach
/// the store.
pub trait Validate {
    type Valid;

    fn validate(self) -> Result<Self::Valid, ApiError>;
}

// Empty strings count as absent.
fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}

/// Strict: both fields are required on create.
impl Validate for CreatePostRequest {
    type Valid = NewPost;

    fn validate(self) -> Result<NewPost, ApiError> {
        match (present(self.title), present(self.contents)) {
            (Some(title), Some(contents)) => Ok(NewPost { title, contents }),
            _ => Err(ApiError::BadRequest(MISSING_BOTH_FIELDS.to_string())),
        }
    }
}

/// Permissive: an update must carry at least one field.
impl Validate for UpdatePostRequest {
    type Valid = PostChanges;

    fn validate(self) -> Result<PostChanges, ApiError> {
        let changes = PostChanges {
            title: present(self.title),
            contents: present(self.contents),
        };
        if changes.title.is_none() && changes.contents.is_none() {
            return Err(ApiError::BadRequest(MISSING_ANY_FIELD.to_string()));
        }
        Ok(changes)
    }
}

/// ValidJson
///
/// JSON body extractor that runs `Validate` before the handler. Malformed JSON
/// and policy violations both reject with 400.
pub struct ValidJson<T: Validate>(pub T::Valid);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: Validate + DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        payload.validate().map(ValidJson)
    }
}
