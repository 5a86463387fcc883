use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;

/// Attribution constant carried in every envelope.
pub const SOURCE: &str = "Hong Kong Observatory";

/// The fixed `dataType` query value for current conditions.
pub const DATA_TYPE: &str = "rhrread";

/// Languages supported by the upstream API.
///
/// This is a closed set; any externally supplied value must be validated
/// against it before reaching the fetcher or the cache layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LanguageCode {
    Tc,
    Sc,
    En,
}

impl LanguageCode {
    pub const ALL: [Self; 3] = [Self::Tc, Self::Sc, Self::En];

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tc" => Some(Self::Tc),
            "sc" => Some(Self::Sc),
            "en" => Some(Self::En),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tc => "tc",
            Self::Sc => "sc",
            Self::En => "en",
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Tc => "Traditional Chinese",
            Self::Sc => "Simplified Chinese",
            Self::En => "English",
        }
    }

    #[must_use]
    pub fn native_name(self) -> &'static str {
        match self {
            Self::Tc => "繁體中文",
            Self::Sc => "简体中文",
            Self::En => "English",
        }
    }
}

impl std::fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uniform wrapper around one fetch outcome.
///
/// Invariant: `success == true` implies `data` is present and `error` absent;
/// `success == false` implies the opposite. `cache_key` is attached only when
/// the envelope was served from cache.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub language: LanguageCode,
    #[serde(default)]
    pub cached: bool,
    #[serde(rename = "cacheKey", default, skip_serializing_if = "Option::is_none")]
    pub cache_key: Option<String>,
}

impl WeatherEnvelope {
    #[must_use]
    pub fn fetched(data: serde_json::Value, language: LanguageCode) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            timestamp: Utc::now(),
            source: SOURCE.to_string(),
            language,
            cached: false,
            cache_key: None,
        }
    }

    #[must_use]
    pub fn failed(error: String, language: LanguageCode) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            timestamp: Utc::now(),
            source: SOURCE.to_string(),
            language,
            cached: false,
            cache_key: None,
        }
    }
}

/// Raw `rhrread` payload, parsed out of `WeatherEnvelope::data` at the
/// normalization boundary. Unknown upstream fields are ignored here but
/// survive in the envelope's raw JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPayload {
    pub rainfall: RainfallSection,
    pub temperature: TemperatureSection,
    #[serde(default)]
    pub humidity: MaybeReport<HumiditySection>,
    #[serde(default)]
    pub uvindex: MaybeReport<UvIndexSection>,
    #[serde(rename = "specialWxTips", default)]
    pub special_wx_tips: serde_json::Value,
    #[serde(rename = "warningMessage", default)]
    pub warning_message: serde_json::Value,
    #[serde(default)]
    pub tcmessage: serde_json::Value,
    #[serde(rename = "updateTime", default)]
    pub update_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RainfallSection {
    #[serde(default)]
    pub data: Vec<RainfallReading>,
    #[serde(rename = "startTime", default)]
    pub start_time: Option<String>,
    #[serde(rename = "endTime", default)]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RainfallReading {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    /// Maximum rainfall over the observation window. Some stations omit it.
    #[serde(default)]
    pub max: Option<f64>,
    /// The upstream marks its headline station with `main: "TRUE"`.
    #[serde(default, deserialize_with = "main_flag")]
    pub main: bool,
}

/// The upstream encodes the main-station flag as the strings "TRUE"/"FALSE".
fn main_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => Ok(b),
        Flag::Text(s) => Ok(s.eq_ignore_ascii_case("true")),
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureSection {
    #[serde(default)]
    pub data: Vec<TemperatureReading>,
    #[serde(rename = "recordTime", default)]
    pub record_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureReading {
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Optional upstream sections arrive either as an empty-string sentinel
/// ("not currently reported") or as a populated object. The ambiguity is
/// resolved here, once, and never propagated further into the system.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MaybeReport<T> {
    Absent(String),
    Present(T),
}

impl<T> MaybeReport<T> {
    #[must_use]
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Self::Absent(_) => None,
            Self::Present(v) => Some(v),
        }
    }
}

impl<T> Default for MaybeReport<T> {
    fn default() -> Self {
        Self::Absent(String::new())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UvIndexSection {
    #[serde(default)]
    pub data: Vec<UvIndexReading>,
    #[serde(rename = "recordDesc", default)]
    pub record_desc: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UvIndexReading {
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HumiditySection {
    #[serde(default)]
    pub data: Vec<HumidityReading>,
    #[serde(rename = "recordTime", default)]
    pub record_time: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HumidityReading {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub place: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
}

/// Stable-shape weather data derived from `RawPayload`.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedWeather {
    #[serde(rename = "averageRainfall")]
    pub average_rainfall: AverageRainfall,
    pub temperature: NormalizedTemperature,
    #[serde(rename = "specialWxTips")]
    pub special_wx_tips: serde_json::Value,
    #[serde(rename = "warningMessage")]
    pub warning_message: serde_json::Value,
    pub uvindex: NormalizedUvIndex,
    pub humidity: NormalizedHumidity,
    #[serde(rename = "updateTime")]
    pub update_time: Option<String>,
    pub tcmessage: serde_json::Value,
}

/// Mean of the district (non-main) stations' `max` readings.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct AverageRainfall {
    pub unit: Option<String>,
    pub value: Option<f64>,
    #[serde(rename = "startTime")]
    pub start_time: Option<String>,
    #[serde(rename = "endTime")]
    pub end_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedTemperature {
    pub place: Option<String>,
    pub value: Option<f64>,
    pub unit: Option<String>,
    #[serde(rename = "recordTime")]
    pub record_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedUvIndex {
    pub unit: Option<String>,
    pub place: Option<String>,
    pub value: Option<f64>,
    #[serde(rename = "recordDesc")]
    pub record_desc: Option<String>,
}

impl NormalizedUvIndex {
    #[must_use]
    pub fn absent() -> Self {
        Self {
            unit: None,
            place: None,
            value: None,
            record_desc: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedHumidity {
    pub unit: Option<String>,
    pub place: Option<String>,
    pub value: Option<f64>,
    #[serde(rename = "recordTime")]
    pub record_time: Option<String>,
}

impl NormalizedHumidity {
    #[must_use]
    pub fn absent() -> Self {
        Self {
            unit: None,
            place: None,
            value: None,
            record_time: None,
        }
    }
}

/// Envelope returned to API consumers after normalization.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct NormalizedResponse {
    pub data: NormalizedWeather,
    pub cached: bool,
    pub timestamp: DateTime<Utc>,
    pub source: String,
    pub language: LanguageCode,
}
