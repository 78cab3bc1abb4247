//! Weather snapshot and risk assessment models

use serde::{Deserialize, Serialize};

/// Normalized current conditions, recomputed on every request
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WeatherSnapshot {
    /// Temperature in Celsius, rounded
    pub temperature: i64,
    /// Apparent temperature in Celsius, rounded
    pub feels_like: i64,
    /// Relative humidity in percent
    pub humidity: i64,
    /// Wind speed in km/h
    pub wind_speed: f64,
    pub uv_index: f64,
    /// WMO weather interpretation code
    pub weather_code: i64,
    /// Precipitation probability of the first forecast hour, in percent
    pub rain_probability: i64,
}

/// Categorical risk level shared by all hazards
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskLevel {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Extreme => "extreme",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RainRisk {
    pub probability: i64,
    pub risk: RiskLevel,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct UvRisk {
    pub index: f64,
    pub risk: RiskLevel,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AqiRisk {
    pub value: f64,
    pub risk: RiskLevel,
    pub description: String,
}

/// Per-hazard risk assessment
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RiskAssessment {
    pub rain: RainRisk,
    pub uv: UvRisk,
    pub aqi: AqiRisk,
}

/// Body of `/api/weather`: the snapshot fields plus a `risks` object
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct WeatherReport {
    #[serde(flatten)]
    pub snapshot: WeatherSnapshot,
    pub risks: RiskAssessment,
}

/// Round half up, so `-0.5` becomes `0` and `2.5` becomes `3`
#[must_use]
pub fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
