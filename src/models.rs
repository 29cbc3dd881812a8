use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Stored Entity ---

/// Post
///
/// A row of the `posts` table. `id` is assigned by the store on insert and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub contents: String,
}

// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Raw body of `POST /posts`. Both fields are optional at the JSON level so that a
/// missing field surfaces as a 400 with a readable message instead of a
/// deserialization rejection. See `validation::Validate`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

/// UpdatePostRequest
///
/// Raw body of `PUT /posts/{id}`. Any subset of the fields may be sent; omitted
/// fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contents: Option<String>,
}

// --- Validated Inputs (Repository Schemas) ---

/// NewPost
///
/// A create payload that passed the strict policy: both fields present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    pub title: String,
    pub contents: String,
}

/// PostChanges
///
/// An update payload that passed the permissive policy: at least one field present.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub contents: Option<String>,
}

// --- Output Schemas ---

/// ErrorBody
///
/// Body of every error response. `stack` is only populated when the service runs
/// with `EXPOSE_ERROR_STACK` enabled.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ErrorBody {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}
