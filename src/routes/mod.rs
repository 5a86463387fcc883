pub mod health;
pub mod weather;

use axum::{
    Router,
    routing::{delete, get},
};

use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::common::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        health::healthz,
        weather::get_current_weather,
        weather::clear_weather_cache,
        weather::get_cache_info,
        weather::list_languages,
    ),
    components(
        schemas(
            health::HealthResponse,
            weather::ClearCacheResponse,
            weather::CacheInfoResponse,
            weather::LanguageOption,
            crate::hko::models::NormalizedResponse,
            crate::services::weather::CacheInfo,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "weather", description = "Current weather and cache administration"),
    ),
    info(
        title = "HKO Weather API",
        description = "Caching proxy API for Hong Kong Observatory current weather",
        version = "0.1.0"
    )
)]
struct ApiDoc;

pub fn build_router(state: AppState) -> Router {
    let weather_routes = Router::new()
        .route("/current", get(weather::get_current_weather))
        .route(
            "/cache",
            delete(weather::clear_weather_cache).get(weather::get_cache_info),
        )
        .route("/languages", get(weather::list_languages));

    let api_routes = Router::new()
        .nest("/v1/weather", weather_routes)
        .layer(RequestBodyLimitLayer::new(1024 * 1024)); // 1MB body limit

    // Health check routes (kept outside /api for probes)
    let health_routes = Router::new().route("/healthz", get(health::healthz));

    // OpenAPI documentation
    let docs_routes = Router::new().merge(Scalar::with_url("/docs", ApiDoc::openapi()));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .merge(docs_routes)
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
