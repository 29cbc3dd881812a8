use axum::{
    Router,
    extract::FromRef,
    http::HeaderName,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod validation;

pub mod routes;
use routes::{health, posts};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, StoreError};
pub use repository::{Repository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for the posts resource, served at `/api-docs/openapi.json`
/// and rendered by the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::list_posts, handlers::get_post, handlers::create_post,
        handlers::update_post, handlers::delete_post
    ),
    components(
        schemas(
            models::Post, models::CreatePostRequest, models::UpdatePostRequest,
            models::ErrorBody,
        )
    ),
    tags(
        (name = "posts", description = "Posts CRUD API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared by every request. The store handle is injected here at startup instead
/// of living in a global, so tests can swap in any `Repository`.
#[derive(Clone)]
pub struct AppState {
    /// Data-access layer.
    pub repo: RepositoryState,
    /// The loaded, immutable configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the routes, the error formatter and the observability layers, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(health::health_routes())
        .merge(posts::post_routes(&state))
        .fallback(handlers::route_not_found)
        // Set before the layers below so the 405 answer is wrapped by them too.
        .method_not_allowed_fallback(handlers::method_not_allowed)
        // Terminal error stage: wraps every route and both fallbacks, so it sees
        // each `ApiError` response and is the only place writing error bodies.
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            error::format_errors,
        ))
        .with_state(state);

    // 3. Observability and Correlation Layers (applied outermost)
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, tagged with the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS Layer
        .layer(cors)
}

/// trace_span_logger
///
/// Span factory for `TraceLayer`: method, URI and the `x-request-id` set by the
/// layer above, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
