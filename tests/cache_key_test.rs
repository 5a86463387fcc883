//! Unit tests for cache key construction.
//!
//! Run with: cargo test --test cache_key_test

use hko_weather_api::cache::cache_key;
use hko_weather_api::hko::models::LanguageCode;
use hko_weather_api::services::weather::{current_weather_key, namespace_pattern};

#[test]
fn cache_key_builds_correctly() {
    // Basic key building
    assert_eq!(cache_key("weather", &[]), "weather");
    assert_eq!(
        cache_key("weather", &["current", "en"]),
        "weather:current:en"
    );

    // Empty components preserved (ensures query uniqueness)
    assert_ne!(
        cache_key("weather", &["current", "", "en"]),
        cache_key("weather", &["current", "en"])
    );
}

#[test]
fn weather_keys_are_deterministic() {
    for lang in LanguageCode::ALL {
        assert_eq!(current_weather_key(lang), current_weather_key(lang));
    }
}

#[test]
fn weather_keys_are_distinct_per_language() {
    let keys: Vec<String> = LanguageCode::ALL
        .into_iter()
        .map(current_weather_key)
        .collect();

    assert_eq!(
        keys,
        ["weather:current:tc", "weather:current:sc", "weather:current:en"]
    );

    for (i, a) in keys.iter().enumerate() {
        for b in &keys[i + 1..] {
            assert_ne!(a, b);
        }
    }
}

#[test]
fn weather_keys_live_under_the_namespace() {
    let prefix = namespace_pattern();
    let prefix = prefix.trim_end_matches('*');

    for lang in LanguageCode::ALL {
        assert!(current_weather_key(lang).starts_with(prefix));
    }
}
