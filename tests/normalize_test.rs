//! Unit tests for payload normalization.
//!
//! Fixtures mirror the Hong Kong Observatory `rhrread` shapes, including
//! the empty-string sentinel for unreported sections and the stringly
//! main-station flag.
//!
//! Run with: cargo test --test normalize_test

use serde_json::{Value, json};

use hko_weather_api::error::AppError;
use hko_weather_api::hko::models::{LanguageCode, WeatherEnvelope};
use hko_weather_api::hko::normalize::normalize;

fn base_payload() -> Value {
    json!({
        "rainfall": {
            "data": [
                { "unit": "mm", "place": "Central & Western District", "max": 5.0, "main": "TRUE" },
                { "unit": "mm", "place": "Eastern District", "max": 2.0, "main": "FALSE" },
                { "unit": "mm", "place": "Kwai Tsing", "max": 4.0, "main": "FALSE" }
            ],
            "startTime": "2026-08-30T09:45:00+08:00",
            "endTime": "2026-08-30T10:45:00+08:00"
        },
        "temperature": {
            "data": [
                { "place": "King's Park", "value": 29.0, "unit": "C" },
                { "place": "Hong Kong Observatory", "value": 30.0, "unit": "C" },
                { "place": "Wong Chuk Hang", "value": 31.0, "unit": "C" }
            ],
            "recordTime": "2026-08-30T11:00:00+08:00"
        },
        "humidity": "",
        "uvindex": "",
        "specialWxTips": ["Thunderstorm warning in force"],
        "warningMessage": "",
        "tcmessage": "",
        "updateTime": "2026-08-30T11:02:00+08:00"
    })
}

fn envelope_with(payload: Value) -> WeatherEnvelope {
    WeatherEnvelope::fetched(payload, LanguageCode::En)
}

#[test]
fn average_rainfall_excludes_main_station() {
    let normalized = normalize(&envelope_with(base_payload())).unwrap();

    // Mean of 2 and 4; the main station's 5 is excluded.
    assert_eq!(normalized.data.average_rainfall.value, Some(3.0));
    assert_eq!(normalized.data.average_rainfall.unit.as_deref(), Some("mm"));
    assert_eq!(
        normalized.data.average_rainfall.start_time.as_deref(),
        Some("2026-08-30T09:45:00+08:00")
    );
    assert_eq!(
        normalized.data.average_rainfall.end_time.as_deref(),
        Some("2026-08-30T10:45:00+08:00")
    );
}

#[test]
fn mixed_rainfall_units_fail_normalization() {
    let mut payload = base_payload();
    payload["rainfall"]["data"][1]["unit"] = json!("in");

    let err = normalize(&envelope_with(payload)).unwrap_err();
    assert!(matches!(err, AppError::DataIntegrity(_)));
}

#[test]
fn mixed_units_detected_even_on_main_station() {
    // The unit consistency check covers ALL entries, not just the
    // district stations used for the average.
    let mut payload = base_payload();
    payload["rainfall"]["data"][0]["unit"] = json!("in");

    let err = normalize(&envelope_with(payload)).unwrap_err();
    assert!(matches!(err, AppError::DataIntegrity(_)));
}

#[test]
fn empty_district_set_yields_null_average() {
    let mut payload = base_payload();
    payload["rainfall"]["data"] = json!([
        { "unit": "mm", "place": "Central & Western District", "max": 5.0, "main": "TRUE" }
    ]);

    let normalized = normalize(&envelope_with(payload)).unwrap();
    assert_eq!(normalized.data.average_rainfall.value, None);
    assert_eq!(normalized.data.average_rainfall.unit.as_deref(), Some("mm"));
}

#[test]
fn readings_without_max_are_skipped() {
    let mut payload = base_payload();
    payload["rainfall"]["data"] = json!([
        { "unit": "mm", "place": "Eastern District", "max": 6.0, "main": "FALSE" },
        { "unit": "mm", "place": "Islands District", "main": "FALSE" }
    ]);

    let normalized = normalize(&envelope_with(payload)).unwrap();
    assert_eq!(normalized.data.average_rainfall.value, Some(6.0));
}

#[test]
fn temperature_uses_second_station() {
    let normalized = normalize(&envelope_with(base_payload())).unwrap();

    assert_eq!(
        normalized.data.temperature.place.as_deref(),
        Some("Hong Kong Observatory")
    );
    assert_eq!(normalized.data.temperature.value, Some(30.0));
    assert_eq!(normalized.data.temperature.unit.as_deref(), Some("C"));
    assert_eq!(
        normalized.data.temperature.record_time.as_deref(),
        Some("2026-08-30T11:00:00+08:00")
    );
}

#[test]
fn short_temperature_list_fails_normalization() {
    let mut payload = base_payload();
    payload["temperature"]["data"] = json!([
        { "place": "King's Park", "value": 29.0, "unit": "C" }
    ]);

    let err = normalize(&envelope_with(payload)).unwrap_err();
    assert!(matches!(err, AppError::DataIntegrity(_)));
}

#[test]
fn sentinel_uvindex_normalizes_to_all_null() {
    let normalized = normalize(&envelope_with(base_payload())).unwrap();

    let uv = &normalized.data.uvindex;
    assert_eq!(uv.unit, None);
    assert_eq!(uv.place, None);
    assert_eq!(uv.value, None);
    assert_eq!(uv.record_desc, None);
}

#[test]
fn populated_uvindex_projects_first_reading() {
    let mut payload = base_payload();
    payload["uvindex"] = json!({
        "data": [
            { "place": "King's Park", "value": 4.0, "unit": "index" }
        ],
        "recordDesc": "During the past hour"
    });

    let normalized = normalize(&envelope_with(payload)).unwrap();

    let uv = &normalized.data.uvindex;
    assert_eq!(uv.place.as_deref(), Some("King's Park"));
    assert_eq!(uv.value, Some(4.0));
    assert_eq!(uv.unit.as_deref(), Some("index"));
    assert_eq!(uv.record_desc.as_deref(), Some("During the past hour"));
}

#[test]
fn populated_humidity_projects_first_reading() {
    let mut payload = base_payload();
    payload["humidity"] = json!({
        "data": [
            { "unit": "percent", "place": "Hong Kong Observatory", "value": 78.0 }
        ],
        "recordTime": "2026-08-30T11:00:00+08:00"
    });

    let normalized = normalize(&envelope_with(payload)).unwrap();

    let humidity = &normalized.data.humidity;
    assert_eq!(humidity.unit.as_deref(), Some("percent"));
    assert_eq!(humidity.place.as_deref(), Some("Hong Kong Observatory"));
    assert_eq!(humidity.value, Some(78.0));
    assert_eq!(
        humidity.record_time.as_deref(),
        Some("2026-08-30T11:00:00+08:00")
    );
}

#[test]
fn advisory_fields_pass_through_unchanged() {
    let normalized = normalize(&envelope_with(base_payload())).unwrap();

    assert_eq!(
        normalized.data.special_wx_tips,
        json!(["Thunderstorm warning in force"])
    );
    assert_eq!(normalized.data.warning_message, json!(""));
    assert_eq!(normalized.data.tcmessage, json!(""));
    assert_eq!(
        normalized.data.update_time.as_deref(),
        Some("2026-08-30T11:02:00+08:00")
    );
}

#[test]
fn envelope_metadata_is_carried_over() {
    let mut envelope = envelope_with(base_payload());
    envelope.cached = true;

    let normalized = normalize(&envelope).unwrap();

    assert!(normalized.cached);
    assert_eq!(normalized.source, "Hong Kong Observatory");
    assert_eq!(normalized.language, LanguageCode::En);
    assert_eq!(normalized.timestamp, envelope.timestamp);
}

#[test]
fn unexpected_payload_shape_is_an_upstream_error() {
    let err = normalize(&envelope_with(json!({ "rainfall": 42 }))).unwrap_err();
    assert!(matches!(err, AppError::Upstream(_)));
}

#[test]
fn normalized_response_serializes_camel_case() {
    let normalized = normalize(&envelope_with(base_payload())).unwrap();
    let value = serde_json::to_value(&normalized).unwrap();

    assert!(value["data"]["averageRainfall"].is_object());
    assert_eq!(value["data"]["averageRainfall"]["value"], json!(3.0));
    assert_eq!(value["data"]["uvindex"]["recordDesc"], Value::Null);
    assert_eq!(value["language"], json!("en"));
}
