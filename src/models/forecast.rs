//! Forecast period and per-day forecast models

use serde::{Deserialize, Serialize};

/// Requested forecast period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForecastPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ForecastPeriod {
    /// Parse a period name; anything unrecognized is treated as daily
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "weekly" => ForecastPeriod::Weekly,
            "monthly" => ForecastPeriod::Monthly,
            "yearly" => ForecastPeriod::Yearly,
            _ => ForecastPeriod::Daily,
        }
    }

    /// Number of days requested from the provider.
    ///
    /// The provider serves at most 16 days, so yearly shares the monthly horizon.
    #[must_use]
    pub fn horizon_days(&self) -> u8 {
        match self {
            ForecastPeriod::Daily => 1,
            ForecastPeriod::Weekly => 7,
            ForecastPeriod::Monthly | ForecastPeriod::Yearly => 16,
        }
    }

    /// Fixed confidence score reported with the forecast
    #[must_use]
    pub fn confidence(&self) -> u8 {
        match self {
            ForecastPeriod::Daily => 90,
            ForecastPeriod::Weekly => 80,
            ForecastPeriod::Monthly => 70,
            ForecastPeriod::Yearly => 60,
        }
    }
}

/// One day of forecast, in the provider's chronological order
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    /// ISO-8601 date
    pub date: String,
    pub temp_max: i64,
    pub temp_min: i64,
    /// Precipitation sum in mm
    pub precipitation: f64,
    pub uv_index: f64,
    /// Maximum wind speed in km/h
    pub wind_speed: f64,
}

/// Body of `/api/forecast`
///
/// `confidence` is left out when the provider returned no daily series.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ForecastReport {
    pub period: String,
    pub data: Vec<ForecastDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<u8>,
}

impl ForecastReport {
    /// Report for a period the provider had no daily series for
    #[must_use]
    pub fn empty(period: &str) -> Self {
        Self {
            period: period.to_string(),
            data: Vec::new(),
            confidence: None,
        }
    }
}
