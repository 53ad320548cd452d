use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

use ubo_sync::config::Config;
use ubo_sync::db::Database;
use ubo_sync::db_storage::ShareholderMappingStorage;
use ubo_sync::handlers::{self, AppState};
use ubo_sync::mirakl_client::MiraklClient;
use ubo_sync::obs;
use ubo_sync::ubo::UboService;

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - Database connection and the shareholder mapping table.
/// - The marketplace client and the UBO service.
/// - HTTP routes and middleware.
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    obs::init_tracing("ubo_sync=debug,tower_http=debug");

    let config = Config::from_env()?;

    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    let mapping_store = ShareholderMappingStorage::new(db.pool.clone());
    mapping_store.ensure_schema().await?;

    let ubo_service = UboService::new(config.max_ubos)?;
    tracing::info!("UBO key schema generated for {} slot(s)", ubo_service.max_ubos());

    let mirakl_client =
        MiraklClient::new(config.mirakl_base_url.clone(), config.mirakl_api_key.clone())?;
    tracing::info!("✓ Mirakl client initialized: {}", config.mirakl_base_url);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        ubo_service,
        mapping_store,
        mirakl_client,
    });

    let api_routes = Router::new()
        .route("/api/v1/shops/:shop_id/ubos", post(handlers::extract_shop_ubos))
        .route(
            "/api/v1/shops/:shop_id/ubo-documents",
            get(handlers::classify_shop_documents),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 1MB max payload
                .layer(RequestBodyLimitLayer::new(1024 * 1024)),
        );

    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
