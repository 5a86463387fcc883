use std::sync::Arc;

use crate::cache::CacheStore;
use crate::config::Config;
use crate::hko::HkoClient;
use crate::services::WeatherService;

/// Shared application state, built once at startup and cloned per request.
///
/// The cache store and upstream client are long-lived singletons injected
/// here rather than hidden globals; their lifetime is bounded by process
/// start and shutdown.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub weather: WeatherService,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, hko_client: HkoClient, cache: CacheStore) -> Self {
        Self {
            config: Arc::new(config),
            weather: WeatherService::new(Arc::new(hko_client), cache),
        }
    }
}
