use tokio::net::TcpListener;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use hko_weather_api::cache::CacheStore;
use hko_weather_api::common::AppState;
use hko_weather_api::config::Config;
use hko_weather_api::hko::HkoClient;
use hko_weather_api::routes;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,hko_weather_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting hko-weather-api...");

    // Load configuration
    let config = Config::from_env();
    tracing::info!(
        deployment = ?config.deployment,
        host = %config.api_host,
        port = config.api_port,
        "Configuration loaded"
    );

    // Connect to the cache backend. Failure is non-fatal: the service
    // degrades to uncached operation.
    let cache = CacheStore::connect(&config.redis_url, config.cache_ttl_seconds).await;

    // Create upstream client
    let hko_client = HkoClient::new(&config);
    tracing::info!(base_url = %config.hko_base_url, "HKO client initialized");

    // Create application state
    let state = AppState::new(config.clone(), hko_client, cache);

    // Build router
    let app = routes::build_router(state.clone());

    // Start server with graceful shutdown
    let addr = config.bind_address();
    tracing::info!(address = %addr, "Starting server");
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Close the cache connection before exiting
    state.weather.cache().disconnect();

    tracing::info!("Server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        },
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        },
    }
}
