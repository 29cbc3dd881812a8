use async_trait::async_trait;
use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use posts_api::{
    ApiError, AppConfig, AppState, StoreError,
    handlers::{self, CREATE_FAILED, LIST_FAILED},
    models::{NewPost, Post, PostChanges},
    repository::Repository,
    validation::{FoundPost, PostId, ValidJson},
};
use std::sync::{Arc, Mutex};
use tokio::test;

// --- MOCK REPOSITORY IMPLEMENTATION ---

// Canned results for each repository call, plus a record of what the handler
// passed in.
pub struct MockRepoControl {
    pub posts_to_return: Vec<Post>,
    pub get_result: Option<Post>,
    pub affected_rows: u64,
    pub fail: bool,
    pub last_update: Mutex<Option<(i64, PostChanges)>>,
}

impl Default for MockRepoControl {
    fn default() -> Self {
        MockRepoControl {
            posts_to_return: vec![],
            get_result: Some(sample_post()),
            affected_rows: 1,
            fail: false,
            last_update: Mutex::new(None),
        }
    }
}

impl MockRepoControl {
    fn check(&self) -> Result<(), StoreError> {
        if self.fail {
            return Err(StoreError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MockRepoControl {
    async fn list(&self) -> Result<Vec<Post>, StoreError> {
        self.check()?;
        Ok(self.posts_to_return.clone())
    }
    async fn get_by_id(&self, _id: i64) -> Result<Option<Post>, StoreError> {
        self.check()?;
        Ok(self.get_result.clone())
    }
    async fn create(&self, post: NewPost) -> Result<Post, StoreError> {
        self.check()?;
        Ok(Post {
            id: 42,
            title: post.title,
            contents: post.contents,
        })
    }
    async fn update(&self, id: i64, changes: PostChanges) -> Result<u64, StoreError> {
        self.check()?;
        *self.last_update.lock().unwrap() = Some((id, changes));
        Ok(self.affected_rows)
    }
    async fn remove(&self, _id: i64) -> Result<u64, StoreError> {
        self.check()?;
        Ok(self.affected_rows)
    }
}

// --- TEST UTILITIES ---

const TEST_ID: i64 = 7;

fn sample_post() -> Post {
    Post {
        id: TEST_ID,
        title: "Title".to_string(),
        contents: "Contents".to_string(),
    }
}

fn create_test_state(repo_control: MockRepoControl) -> (AppState, Arc<MockRepoControl>) {
    let repo = Arc::new(repo_control);
    let state = AppState {
        repo: repo.clone(),
        config: AppConfig::default(),
    };
    (state, repo)
}

// --- HANDLER TESTS ---

#[test]
async fn test_list_posts_success() {
    let (state, _) = create_test_state(MockRepoControl {
        posts_to_return: vec![
            sample_post(),
            Post {
                id: TEST_ID + 1,
                title: "Second".to_string(),
                contents: "More".to_string(),
            },
        ],
        ..MockRepoControl::default()
    });

    let Json(posts) = handlers::list_posts(State(state)).await.unwrap();

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0], sample_post());
    assert_eq!(posts[1].title, "Second");
}

#[test]
async fn test_list_posts_store_failure() {
    let (state, _) = create_test_state(MockRepoControl {
        fail: true,
        ..MockRepoControl::default()
    });

    let err = handlers::list_posts(State(state)).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.to_string(), LIST_FAILED);
}

#[test]
async fn test_get_post_returns_the_resolved_row() {
    let Json(post) = handlers::get_post(Extension(FoundPost(sample_post()))).await;

    assert_eq!(post, sample_post());
}

#[test]
async fn test_create_post_returns_created() {
    let (state, _) = create_test_state(MockRepoControl::default());
    let new_post = NewPost {
        title: "A".to_string(),
        contents: "B".to_string(),
    };

    let result = handlers::create_post(State(state), ValidJson(new_post)).await;

    let response = result.unwrap().into_response();
    assert_eq!(response.status(), StatusCode::CREATED);
    let (_parts, body) = response.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    let post: Post = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(post.id, 42);
    assert_eq!(post.title, "A");
    assert_eq!(post.contents, "B");
}

#[test]
async fn test_create_post_store_failure() {
    let (state, _) = create_test_state(MockRepoControl {
        fail: true,
        ..MockRepoControl::default()
    });
    let new_post = NewPost {
        title: "A".to_string(),
        contents: "B".to_string(),
    };

    let err = handlers::create_post(State(state), ValidJson(new_post))
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::Internal { .. }));
    assert_eq!(err.to_string(), CREATE_FAILED);
}

#[test]
async fn test_update_post_passes_changes_and_returns_row() {
    let (state, repo) = create_test_state(MockRepoControl::default());
    let changes = PostChanges {
        title: Some("New".to_string()),
        contents: None,
    };

    let Json(post) = handlers::update_post(State(state), PostId(TEST_ID), ValidJson(changes.clone()))
        .await
        .unwrap();

    assert_eq!(post, sample_post());
    assert_eq!(*repo.last_update.lock().unwrap(), Some((TEST_ID, changes)));
}

#[test]
async fn test_update_post_not_found_on_zero_rows() {
    let (state, _) = create_test_state(MockRepoControl {
        affected_rows: 0,
        ..MockRepoControl::default()
    });
    let changes = PostChanges {
        title: Some("New".to_string()),
        contents: None,
    };

    let err = handlers::update_post(State(state), PostId(TEST_ID), ValidJson(changes))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_update_post_row_vanished_before_read_back() {
    let (state, _) = create_test_state(MockRepoControl {
        get_result: None,
        ..MockRepoControl::default()
    });
    let changes = PostChanges {
        title: None,
        contents: Some("C".to_string()),
    };

    let err = handlers::update_post(State(state), PostId(TEST_ID), ValidJson(changes))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_delete_post_success() {
    let (state, _) = create_test_state(MockRepoControl::default());

    let status = handlers::delete_post(State(state), PostId(TEST_ID)).await.unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[test]
async fn test_delete_post_not_found() {
    let (state, _) = create_test_state(MockRepoControl {
        affected_rows: 0,
        ..MockRepoControl::default()
    });

    let err = handlers::delete_post(State(state), PostId(TEST_ID))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::NOT_FOUND);
}

#[test]
async fn test_delete_post_store_failure() {
    let (state, _) = create_test_state(MockRepoControl {
        fail: true,
        ..MockRepoControl::default()
    });

    let err = handlers::delete_post(State(state), PostId(TEST_ID))
        .await
        .unwrap_err();

    assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
