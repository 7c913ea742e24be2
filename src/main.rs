use feedback_insights_api::analysis_cache::AnalysisCache;
use feedback_insights_api::analyzer::TextAnalyzer;
use feedback_insights_api::config::Config;
use feedback_insights_api::db::Database;
use feedback_insights_api::db_storage::FeedbackStorage;
use feedback_insights_api::handlers::AppState;
use feedback_insights_api::router::build_router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::limit::RequestBodyLimitLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes logging, configuration, the feedback store and the analysis
/// providers (once, shared by every request), then serves the HTTP API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedback_insights_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!("Configuration loaded successfully");

    // Open the feedback store, creating the table if absent
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Feedback store ready");

    let analyzer = TextAnalyzer::from_config(&config)?;
    tracing::info!("Analysis providers initialized");

    let analysis_cache = AnalysisCache::new(
        Duration::from_secs(config.analysis_cache_ttl_secs),
        10_000,
    );
    tracing::info!(
        "Analysis cache initialized ({}s TTL, 10k capacity)",
        config.analysis_cache_ttl_secs
    );

    let app_state = Arc::new(AppState {
        storage: FeedbackStorage::new(db.pool.clone()),
        config: config.clone(),
        analyzer,
        analysis_cache,
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let app = build_router(app_state).layer(
        ServiceBuilder::new()
            // Feedback texts are small; 1MB is plenty
            .layer(RequestBodyLimitLayer::new(1024 * 1024))
            .layer(GovernorLayer {
                config: governor_conf,
            }),
    );

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
