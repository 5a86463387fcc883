use reqwest::Client;
use std::time::Duration;

use crate::config::Config;
use crate::hko::models::{DATA_TYPE, LanguageCode, WeatherEnvelope};

const USER_AGENT: &str = "Weather-App-Backend/1.0";

/// HTTP client for the Hong Kong Observatory open-data endpoint.
///
/// This is the sole source of upstream data. It performs no caching and no
/// normalization; every outcome, including transport failures, is folded
/// into a [`WeatherEnvelope`] so nothing escapes this boundary as an `Err`.
pub struct HkoClient {
    http_client: Client,
    base_url: String,
}

impl HkoClient {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.hko_timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            http_client,
            base_url: config.hko_base_url.clone(),
        }
    }

    /// Fetch current conditions for the given language.
    ///
    /// Returns a `success=false` envelope on network errors, timeouts,
    /// non-success statuses, and unparseable bodies.
    pub async fn fetch_current(&self, language: LanguageCode) -> WeatherEnvelope {
        let url = format!(
            "{}?dataType={}&lang={}",
            self.base_url, DATA_TYPE, language
        );

        tracing::debug!(url = %url, lang = %language, "Fetching weather data");

        let response = match self
            .http_client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(lang = %language, error = %e, "Weather fetch failed");
                return WeatherEnvelope::failed(format!("Request failed: {e}"), language);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(lang = %language, status = %status, "Upstream returned error status");
            return WeatherEnvelope::failed(format!("HTTP {status}: {body}"), language);
        }

        match response.json::<serde_json::Value>().await {
            Ok(data) => WeatherEnvelope::fetched(data, language),
            Err(e) => {
                tracing::warn!(lang = %language, error = %e, "Failed to parse upstream body");
                WeatherEnvelope::failed(format!("Failed to parse response: {e}"), language)
            }
        }
    }
}
