//! Normalization of the raw `rhrread` payload into a stable response shape.
//!
//! The upstream payload is inconsistent: optional sections are either an
//! empty-string sentinel or a populated object, the main-station flag is a
//! string, and rainfall arrives as heterogeneous per-station readings. This
//! module resolves all of that once, at the boundary, and hands a fixed
//! schema to API consumers.

use std::collections::BTreeSet;

use crate::error::{AppError, AppResult};
use crate::hko::models::{
    AverageRainfall, NormalizedHumidity, NormalizedResponse, NormalizedTemperature,
    NormalizedUvIndex, NormalizedWeather, RawPayload, WeatherEnvelope,
};

/// Positional index of the representative temperature station.
///
/// A known simplification: the upstream does not contractually guarantee
/// station ordering.
const TEMPERATURE_STATION_INDEX: usize = 1;

/// Normalize a successful fetch envelope.
///
/// Must only be called with `envelope.success == true`; a successful
/// envelope without data violates the envelope invariant and is reported
/// as an internal error.
///
/// # Errors
///
/// - `AppError::Upstream` when the payload does not match the expected
///   `rhrread` shape.
/// - `AppError::DataIntegrity` when rainfall readings mix units or the
///   temperature station list is too short to hold the representative
///   station.
pub fn normalize(envelope: &WeatherEnvelope) -> AppResult<NormalizedResponse> {
    let data = envelope
        .data
        .as_ref()
        .ok_or_else(|| AppError::Internal("successful envelope without data".to_string()))?;

    let payload: RawPayload = serde_json::from_value(data.clone())
        .map_err(|e| AppError::Upstream(format!("Unexpected payload shape: {e}")))?;

    Ok(NormalizedResponse {
        data: normalize_payload(&payload)?,
        cached: envelope.cached,
        timestamp: envelope.timestamp,
        source: envelope.source.clone(),
        language: envelope.language,
    })
}

fn normalize_payload(payload: &RawPayload) -> AppResult<NormalizedWeather> {
    // Distinct units across ALL rainfall entries, main station included.
    // More than one unit means the readings cannot be averaged together;
    // failing loudly beats silently picking one.
    let units: BTreeSet<&str> = payload
        .rainfall
        .data
        .iter()
        .filter_map(|r| r.unit.as_deref())
        .collect();
    if units.len() > 1 {
        return Err(AppError::DataIntegrity(
            "Rainfall data has multiple units".to_string(),
        ));
    }

    // The average reflects district stations only; the headline station is
    // excluded. Readings without a max value contribute nothing.
    let district_max: Vec<f64> = payload
        .rainfall
        .data
        .iter()
        .filter(|r| !r.main)
        .filter_map(|r| r.max)
        .collect();
    let average = if district_max.is_empty() {
        None
    } else {
        let count = district_max.len() as f64;
        Some(district_max.iter().sum::<f64>() / count)
    };

    let temperature = payload
        .temperature
        .data
        .get(TEMPERATURE_STATION_INDEX)
        .ok_or_else(|| {
            AppError::DataIntegrity(format!(
                "Temperature data has no station at index {TEMPERATURE_STATION_INDEX}"
            ))
        })?;

    let uvindex = match payload.uvindex.as_present() {
        None => NormalizedUvIndex::absent(),
        Some(section) => {
            let first = section.data.first();
            NormalizedUvIndex {
                unit: first.and_then(|r| r.unit.clone()),
                place: first.and_then(|r| r.place.clone()),
                value: first.and_then(|r| r.value),
                record_desc: section.record_desc.clone(),
            }
        }
    };

    let humidity = match payload.humidity.as_present() {
        None => NormalizedHumidity::absent(),
        Some(section) => {
            let first = section.data.first();
            NormalizedHumidity {
                unit: first.and_then(|r| r.unit.clone()),
                place: first.and_then(|r| r.place.clone()),
                value: first.and_then(|r| r.value),
                record_time: section.record_time.clone(),
            }
        }
    };

    Ok(NormalizedWeather {
        average_rainfall: AverageRainfall {
            unit: units.iter().next().map(|u| (*u).to_string()),
            value: average,
            start_time: payload.rainfall.start_time.clone(),
            end_time: payload.rainfall.end_time.clone(),
        },
        temperature: NormalizedTemperature {
            place: temperature.place.clone(),
            value: temperature.value,
            unit: temperature.unit.clone(),
            record_time: payload.temperature.record_time.clone(),
        },
        special_wx_tips: payload.special_wx_tips.clone(),
        warning_message: payload.warning_message.clone(),
        uvindex,
        humidity,
        update_time: payload.update_time.clone(),
        tcmessage: payload.tcmessage.clone(),
    })
}
