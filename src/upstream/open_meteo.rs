//! Open-Meteo forecast and air-quality client
//!
//! No API key is required. Response structures keep every section optional;
//! deciding which absences are fatal is up to the callers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::fetch_json;
use crate::Result;
use crate::models::Coordinates;

const FORECAST_PROVIDER: &str = "open-meteo";
const AIR_QUALITY_PROVIDER: &str = "open-meteo-air-quality";

/// Weather and air-quality data source
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Current conditions with hourly and daily context for today
    async fn current(&self, coords: Coordinates) -> Result<ForecastResponse>;

    /// Hourly air-quality series
    async fn air_quality(&self, coords: Coordinates) -> Result<AirQualityResponse>;

    /// Daily series covering `days` days
    async fn daily(&self, coords: Coordinates, days: u8) -> Result<ForecastResponse>;
}

/// Open-Meteo API client
pub struct OpenMeteoClient {
    client: Client,
    forecast_base_url: String,
    air_quality_base_url: String,
}

impl OpenMeteoClient {
    #[must_use]
    pub fn new(
        client: Client,
        forecast_base_url: impl Into<String>,
        air_quality_base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            forecast_base_url: forecast_base_url.into(),
            air_quality_base_url: air_quality_base_url.into(),
        }
    }
}

#[async_trait]
impl WeatherSource for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn current(&self, coords: Coordinates) -> Result<ForecastResponse> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&current=temperature_2m,relative_humidity_2m,wind_speed_10m,uv_index,weather_code&hourly=temperature_2m,precipitation_probability&daily=temperature_2m_max,temperature_2m_min,precipitation_sum,uv_index_max&timezone=auto&forecast_days=1",
            self.forecast_base_url, coords.latitude, coords.longitude
        );
        fetch_json(FORECAST_PROVIDER, self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn air_quality(&self, coords: Coordinates) -> Result<AirQualityResponse> {
        let url = format!(
            "{}/air-quality?latitude={}&longitude={}&hourly=pm2_5,pm10,us_aqi&timezone=auto",
            self.air_quality_base_url, coords.latitude, coords.longitude
        );
        fetch_json(AIR_QUALITY_PROVIDER, self.client.get(url)).await
    }

    #[instrument(skip(self))]
    async fn daily(&self, coords: Coordinates, days: u8) -> Result<ForecastResponse> {
        let url = format!(
            "{}/forecast?latitude={}&longitude={}&daily=temperature_2m_max,temperature_2m_min,precipitation_sum,uv_index_max,wind_speed_10m_max&timezone=auto&forecast_days={}",
            self.forecast_base_url, coords.latitude, coords.longitude, days
        );
        fetch_json(FORECAST_PROVIDER, self.client.get(url)).await
    }
}

/// Numeric series as delivered by Open-Meteo; individual samples may be null
pub type Series = Option<Vec<Option<f64>>>;

/// Sample at `index`, `None` when the series, the index or the value is missing
#[must_use]
pub fn sample(series: &Series, index: usize) -> Option<f64> {
    series.as_ref()?.get(index).copied().flatten()
}

/// Forecast response from Open-Meteo
#[derive(Debug, Deserialize, Default, Clone)]
pub struct ForecastResponse {
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub current: Option<CurrentData>,
    #[serde(default)]
    pub hourly: Option<HourlyData>,
    #[serde(default)]
    pub daily: Option<DailyData>,
}

/// Current conditions block
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CurrentData {
    #[serde(default)]
    pub temperature_2m: Option<f64>,
    #[serde(default)]
    pub relative_humidity_2m: Option<f64>,
    #[serde(default)]
    pub wind_speed_10m: Option<f64>,
    #[serde(default)]
    pub uv_index: Option<f64>,
    #[serde(default)]
    pub weather_code: Option<i64>,
}

/// Hourly block of the forecast response
#[derive(Debug, Deserialize, Default, Clone)]
pub struct HourlyData {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub temperature_2m: Series,
    #[serde(default)]
    pub precipitation_probability: Series,
}

/// Daily block of the forecast response
#[derive(Debug, Deserialize, Default, Clone)]
pub struct DailyData {
    #[serde(default)]
    pub time: Option<Vec<String>>,
    #[serde(default)]
    pub temperature_2m_max: Series,
    #[serde(default)]
    pub temperature_2m_min: Series,
    #[serde(default)]
    pub precipitation_sum: Series,
    #[serde(default)]
    pub uv_index_max: Series,
    #[serde(default)]
    pub wind_speed_10m_max: Series,
}

/// Air-quality response from Open-Meteo
#[derive(Debug, Deserialize, Default, Clone)]
pub struct AirQualityResponse {
    #[serde(default)]
    pub hourly: Option<AirQualityHourly>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct AirQualityHourly {
    #[serde(default)]
    pub time: Vec<String>,
    #[serde(default)]
    pub pm2_5: Series,
    #[serde(default)]
    pub pm10: Series,
    #[serde(default)]
    pub us_aqi: Series,
}
