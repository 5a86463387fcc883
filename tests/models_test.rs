//! Serde behavior of envelope and upstream payload models.
//!
//! Run with: cargo test --test models_test

use serde_json::json;

use hko_weather_api::hko::models::{LanguageCode, MaybeReport, RawPayload, WeatherEnvelope};

#[test]
fn language_codes_form_a_closed_set() {
    assert_eq!(LanguageCode::parse("tc"), Some(LanguageCode::Tc));
    assert_eq!(LanguageCode::parse("sc"), Some(LanguageCode::Sc));
    assert_eq!(LanguageCode::parse("en"), Some(LanguageCode::En));

    assert_eq!(LanguageCode::parse("fr"), None);
    assert_eq!(LanguageCode::parse("EN"), None);
    assert_eq!(LanguageCode::parse(""), None);
}

#[test]
fn language_code_round_trips_through_serde() {
    for lang in LanguageCode::ALL {
        let value = serde_json::to_value(lang).unwrap();
        assert_eq!(value, json!(lang.as_str()));
        assert_eq!(serde_json::from_value::<LanguageCode>(value).unwrap(), lang);
    }
}

#[test]
fn envelope_constructors_uphold_the_invariant() {
    let ok = WeatherEnvelope::fetched(json!({"a": 1}), LanguageCode::Tc);
    assert!(ok.success && ok.data.is_some() && ok.error.is_none());

    let failed = WeatherEnvelope::failed("timeout".to_string(), LanguageCode::Tc);
    assert!(!failed.success && failed.data.is_none() && failed.error.is_some());
}

#[test]
fn envelope_omits_absent_optional_fields() {
    let envelope = WeatherEnvelope::fetched(json!({}), LanguageCode::En);
    let value = serde_json::to_value(&envelope).unwrap();

    // No error on success, no cacheKey until a cache hit attaches one.
    assert!(value.get("error").is_none());
    assert!(value.get("cacheKey").is_none());
    assert_eq!(value["cached"], json!(false));
}

#[test]
fn envelope_survives_a_cache_round_trip() {
    let mut envelope = WeatherEnvelope::fetched(json!({"updateTime": "x"}), LanguageCode::Sc);
    envelope.cache_key = Some("weather:current:sc".to_string());

    let raw = serde_json::to_string(&envelope).unwrap();
    let restored: WeatherEnvelope = serde_json::from_str(&raw).unwrap();

    assert!(restored.success);
    assert_eq!(restored.language, LanguageCode::Sc);
    assert_eq!(restored.data, envelope.data);
    assert_eq!(restored.cache_key.as_deref(), Some("weather:current:sc"));
    assert_eq!(restored.timestamp, envelope.timestamp);
}

#[test]
fn main_flag_accepts_upstream_string_encoding() {
    let payload: RawPayload = serde_json::from_value(json!({
        "rainfall": {
            "data": [
                { "unit": "mm", "max": 1.0, "main": "TRUE" },
                { "unit": "mm", "max": 2.0, "main": "FALSE" },
                { "unit": "mm", "max": 3.0, "main": true }
            ]
        },
        "temperature": { "data": [] }
    }))
    .unwrap();

    let flags: Vec<bool> = payload.rainfall.data.iter().map(|r| r.main).collect();
    assert_eq!(flags, vec![true, false, true]);
}

#[test]
fn sentinel_sections_deserialize_as_absent() {
    let payload: RawPayload = serde_json::from_value(json!({
        "rainfall": { "data": [] },
        "temperature": { "data": [] },
        "humidity": "",
        "uvindex": ""
    }))
    .unwrap();

    assert!(payload.humidity.as_present().is_none());
    assert!(payload.uvindex.as_present().is_none());
}

#[test]
fn missing_sections_default_to_absent() {
    let payload: RawPayload = serde_json::from_value(json!({
        "rainfall": { "data": [] },
        "temperature": { "data": [] }
    }))
    .unwrap();

    assert!(payload.humidity.as_present().is_none());
    assert!(payload.uvindex.as_present().is_none());
}

#[test]
fn populated_sections_deserialize_as_present() {
    let payload: RawPayload = serde_json::from_value(json!({
        "rainfall": { "data": [] },
        "temperature": { "data": [] },
        "uvindex": {
            "data": [{ "place": "King's Park", "value": 4.0 }],
            "recordDesc": "During the past hour"
        }
    }))
    .unwrap();

    let uv = payload.uvindex.as_present().unwrap();
    assert_eq!(uv.data[0].place.as_deref(), Some("King's Park"));
    assert_eq!(uv.record_desc.as_deref(), Some("During the past hour"));

    // Direct sentinel parse for completeness.
    let absent: MaybeReport<serde_json::Value> = serde_json::from_value(json!("")).unwrap();
    assert!(absent.as_present().is_none());
}
