use posts_api::{
    AppState,
    config::{AppConfig, Env},
    create_router, repository,
};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, connects the store and serves HTTP.
/// Any startup failure aborts the process with the error.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Configuration (fail-fast on missing or malformed variables)
    dotenv::dotenv().ok();
    let config = AppConfig::load()?;

    // 2. Logging Filter Setup: RUST_LOG wins, otherwise development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "posts_api=debug,tower_http=info,axum=trace".into());

    // 3. Log format per environment: pretty locally, JSON for log aggregators in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Store: backend chosen from the DATABASE_URL scheme.
    let repo = repository::connect(&config).await?;

    // 5. Router and Server Startup
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState { repo, config });

    let listener = TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app).await?;
    Ok(())
}
