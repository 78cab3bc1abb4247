//! Hazard classification
//!
//! Pure functions from a numeric reading to a risk level and a human-readable
//! description. Every comparison is strictly greater-than, so a value sitting
//! exactly on a threshold falls into the lower band.

use crate::models::weather::{AqiRisk, RainRisk, UvRisk};
use crate::models::{RiskAssessment, RiskLevel, WeatherSnapshot};

pub const RAIN_HIGH_ABOVE: i64 = 60;
pub const RAIN_MODERATE_ABOVE: i64 = 30;

pub const UV_EXTREME_ABOVE: f64 = 8.0;
pub const UV_HIGH_ABOVE: f64 = 6.0;
pub const UV_MODERATE_ABOVE: f64 = 3.0;

pub const AQI_HIGH_ABOVE: f64 = 150.0;
pub const AQI_MODERATE_ABOVE: f64 = 100.0;

#[must_use]
pub fn rain_level(probability: i64) -> RiskLevel {
    if probability > RAIN_HIGH_ABOVE {
        RiskLevel::High
    } else if probability > RAIN_MODERATE_ABOVE {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

#[must_use]
pub fn uv_level(index: f64) -> RiskLevel {
    if index > UV_EXTREME_ABOVE {
        RiskLevel::Extreme
    } else if index > UV_HIGH_ABOVE {
        RiskLevel::High
    } else if index > UV_MODERATE_ABOVE {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

#[must_use]
pub fn aqi_level(value: f64) -> RiskLevel {
    if value > AQI_HIGH_ABOVE {
        RiskLevel::High
    } else if value > AQI_MODERATE_ABOVE {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    }
}

/// Category word used in AQI descriptions
#[must_use]
pub fn aqi_category(value: f64) -> &'static str {
    match aqi_level(value) {
        RiskLevel::High | RiskLevel::Extreme => "Unhealthy",
        RiskLevel::Moderate => "Moderate",
        RiskLevel::Low => "Good",
    }
}

#[must_use]
pub fn classify_rain(probability: i64) -> RainRisk {
    RainRisk {
        probability,
        risk: rain_level(probability),
        description: format!("Chance of rain: {probability}%"),
    }
}

#[must_use]
pub fn classify_uv(index: f64) -> UvRisk {
    UvRisk {
        index,
        risk: uv_level(index),
        description: format!("UV Index is {index}"),
    }
}

#[must_use]
pub fn classify_aqi(value: f64) -> AqiRisk {
    AqiRisk {
        value,
        risk: aqi_level(value),
        description: format!("Air Quality Index: {value} ({})", aqi_category(value)),
    }
}

/// Assess every hazard for a snapshot and the current AQI reading
#[must_use]
pub fn assess(snapshot: &WeatherSnapshot, aqi: f64) -> RiskAssessment {
    RiskAssessment {
        rain: classify_rain(snapshot.rain_probability),
        uv: classify_uv(snapshot.uv_index),
        aqi: classify_aqi(aqi),
    }
}
