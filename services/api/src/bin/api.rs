//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{rest::ApiDoc, router, state::AppState},
};
use axum::http::{
    header::{ACCEPT, CONTENT_TYPE},
    HeaderValue, Method,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trip_planner_core::{InMemoryStore, PlanStore, PlannerService, UserStore};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Document Store & Run Migrations ---
    let (plans, users): (Arc<dyn PlanStore>, Arc<dyn UserStore>) = match &config.database_url {
        Some(database_url) => {
            info!("Connecting to database...");
            let db_pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(database_url)
                .await?;
            let db_adapter = Arc::new(DbAdapter::new(db_pool));
            info!("Running database migrations...");
            db_adapter.run_migrations().await?;
            info!("Database migrations complete.");
            let plans: Arc<dyn PlanStore> = db_adapter.clone();
            let users: Arc<dyn UserStore> = db_adapter;
            (plans, users)
        }
        None => {
            warn!("DATABASE_URL is not set; plans will only live in memory.");
            let store = Arc::new(InMemoryStore::new());
            let plans: Arc<dyn PlanStore> = store.clone();
            let users: Arc<dyn UserStore> = store;
            (plans, users)
        }
    };

    // --- 3. Build the Shared AppState ---
    let planner = PlannerService::new(plans, users).with_write_retries(config.write_retry_limit);
    let app_state = Arc::new(AppState {
        planner: Arc::new(planner),
        config: config.clone(),
    });

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);
    let cors = match &config.cors_allow_origin {
        Some(origin) => {
            let origin = origin.parse::<HeaderValue>().map_err(|e| {
                ApiError::Internal(format!("Invalid CORS_ALLOW_ORIGIN '{}': {}", origin, e))
            })?;
            cors.allow_origin(origin)
        }
        None => cors.allow_origin(Any),
    };

    // --- 4. Create the Web Router ---
    // Merge the API router with the Swagger UI router for a complete application.
    let app = router(app_state)
        .layer(cors)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
