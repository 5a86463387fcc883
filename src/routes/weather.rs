use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::common::AppState;
use crate::error::{AppError, AppResult};
use crate::hko::models::{LanguageCode, NormalizedResponse};
use crate::hko::normalize;
use crate::services::weather::CacheInfo;

#[derive(Debug, Deserialize, IntoParams)]
pub struct LangQuery {
    /// Language code (tc, sc, en); defaults to tc
    pub lang: Option<String>,
}

/// Validate the language parameter at the boundary, before any I/O.
/// An absent parameter falls back to Traditional Chinese; a present but
/// unsupported value is a client error.
fn validate_lang(lang: Option<&str>) -> AppResult<Option<LanguageCode>> {
    match lang {
        None => Ok(None),
        Some(s) => LanguageCode::parse(s)
            .map(Some)
            .ok_or_else(|| AppError::Validation("Language must be one of: tc, sc, en".to_string())),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ClearCacheResponse {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CacheInfoResponse {
    #[serde(rename = "cacheInfo")]
    pub cache_info: CacheInfo,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LanguageOption {
    pub code: LanguageCode,
    pub name: &'static str,
    pub description: &'static str,
}

/// Get current weather conditions
///
/// Serves the normalized Hong Kong Observatory `rhrread` payload,
/// cache-aside with a short TTL.
#[utoipa::path(
    get,
    path = "/api/v1/weather/current",
    params(LangQuery),
    responses(
        (status = 200, description = "Current weather retrieved successfully", body = NormalizedResponse),
        (status = 422, description = "Invalid language parameter"),
        (status = 500, description = "Upstream fetch or normalization failed"),
    ),
    tag = "weather"
)]
pub async fn get_current_weather(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<NormalizedResponse>> {
    let language = validate_lang(query.lang.as_deref())?.unwrap_or(LanguageCode::Tc);

    let envelope = state.weather.get_current_weather(language).await;

    if !envelope.success {
        return Err(AppError::Upstream(
            envelope
                .error
                .unwrap_or_else(|| "Unknown upstream error".to_string()),
        ));
    }

    normalize::normalize(&envelope).map(Json)
}

/// Invalidate cached weather data
///
/// Deletes one language's entry, or every entry under the weather
/// namespace when `lang` is omitted.
#[utoipa::path(
    delete,
    path = "/api/v1/weather/cache",
    params(LangQuery),
    responses(
        (status = 200, description = "Cache cleared", body = ClearCacheResponse),
        (status = 422, description = "Invalid language parameter"),
        (status = 500, description = "Cache backend unavailable or operation failed"),
    ),
    tag = "weather"
)]
pub async fn clear_weather_cache(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<ClearCacheResponse>> {
    let language = validate_lang(query.lang.as_deref())?;

    let removed = state.weather.clear_cache(language).await?;

    let message = match language {
        Some(language) => format!("Cache cleared for language: {language}"),
        None => format!("Cleared {removed} weather cache entries"),
    };

    Ok(Json(ClearCacheResponse {
        message,
        timestamp: Utc::now(),
    }))
}

/// Inspect cached weather data
///
/// Reports connection state, the computed cache key, entry existence,
/// and remaining TTL for one language.
#[utoipa::path(
    get,
    path = "/api/v1/weather/cache",
    params(LangQuery),
    responses(
        (status = 200, description = "Cache info retrieved", body = CacheInfoResponse),
        (status = 422, description = "Invalid language parameter"),
        (status = 500, description = "Cache inspection failed"),
    ),
    tag = "weather"
)]
pub async fn get_cache_info(
    State(state): State<AppState>,
    Query(query): Query<LangQuery>,
) -> AppResult<Json<CacheInfoResponse>> {
    let language = validate_lang(query.lang.as_deref())?.unwrap_or(LanguageCode::Tc);

    let cache_info = state.weather.cache_info(language).await?;

    Ok(Json(CacheInfoResponse {
        cache_info,
        timestamp: Utc::now(),
    }))
}

/// List supported languages
#[utoipa::path(
    get,
    path = "/api/v1/weather/languages",
    responses(
        (status = 200, description = "Supported languages", body = Vec<LanguageOption>),
    ),
    tag = "weather"
)]
pub async fn list_languages() -> Json<Vec<LanguageOption>> {
    Json(
        LanguageCode::ALL
            .into_iter()
            .map(|code| LanguageOption {
                code,
                name: code.name(),
                description: code.native_name(),
            })
            .collect(),
    )
}
