//! Current weather and risk classification
//!
//! Fetches current conditions and air quality concurrently, normalizes the
//! current block into a [`WeatherSnapshot`] and attaches per-hazard risks.
//! Air quality is best-effort: any failure there reads as an AQI of 0.

use std::sync::Arc;

use futures::future;
use tracing::{info, instrument, warn};

use crate::models::weather::round_half_up;
use crate::models::{Coordinates, WeatherReport, WeatherSnapshot};
use crate::risk;
use crate::upstream::WeatherSource;
use crate::upstream::open_meteo::{AirQualityResponse, ForecastResponse, sample};
use crate::{ClimateError, Result};

/// Humidity above which the apparent temperature is nudged up instead of down
const MUGGY_HUMIDITY_ABOVE: f64 = 70.0;

/// Apparent temperature: +2 °C when humidity is above 70 %, otherwise -1 °C
#[must_use]
pub fn feels_like(temperature: f64, humidity: f64) -> i64 {
    let adjustment = if humidity > MUGGY_HUMIDITY_ABOVE {
        2.0
    } else {
        -1.0
    };
    round_half_up(temperature + adjustment)
}

/// Build the snapshot from a forecast response.
///
/// # Errors
///
/// Returns a shape error when the response has no `current` block
pub fn snapshot_from(response: &ForecastResponse) -> Result<WeatherSnapshot> {
    let current = response
        .current
        .as_ref()
        .ok_or_else(|| ClimateError::shape("open-meteo", "response has no current block"))?;

    let temperature = current.temperature_2m.unwrap_or(0.0);
    let humidity = current.relative_humidity_2m.unwrap_or(0.0);
    let rain_probability = response
        .hourly
        .as_ref()
        .and_then(|hourly| sample(&hourly.precipitation_probability, 0))
        .unwrap_or(0.0);

    Ok(WeatherSnapshot {
        temperature: round_half_up(temperature),
        feels_like: feels_like(temperature, humidity),
        humidity: round_half_up(humidity),
        wind_speed: current.wind_speed_10m.unwrap_or(0.0),
        uv_index: current.uv_index.unwrap_or(0.0),
        weather_code: current.weather_code.unwrap_or(0),
        rain_probability: round_half_up(rain_probability),
    })
}

/// First hourly US AQI sample, 0 when absent
#[must_use]
pub fn aqi_from(response: &AirQualityResponse) -> f64 {
    response
        .hourly
        .as_ref()
        .and_then(|hourly| sample(&hourly.us_aqi, 0))
        .unwrap_or(0.0)
}

/// Service behind `/api/weather`
pub struct WeatherService {
    source: Arc<dyn WeatherSource>,
}

impl WeatherService {
    #[must_use]
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    /// Fetch and classify current weather.
    ///
    /// # Errors
    ///
    /// Fails when the weather call fails or carries no current block. Air-quality
    /// failures are logged and never fail the call.
    #[instrument(skip(self), fields(coordinates = %coords.format_coordinates()))]
    pub async fn get_weather(&self, coords: Coordinates) -> Result<WeatherReport> {
        let (weather, air_quality) = future::join(
            self.source.current(coords),
            self.source.air_quality(coords),
        )
        .await;

        let aqi = match air_quality {
            Ok(response) => aqi_from(&response),
            Err(e) => {
                warn!("Air quality lookup failed, using AQI 0: {}", e);
                0.0
            }
        };

        let snapshot = snapshot_from(&weather?)?;
        let risks = risk::assess(&snapshot, aqi);
        info!(
            temperature = snapshot.temperature,
            rain = risks.rain.risk.as_str(),
            uv = risks.uv.risk.as_str(),
            aqi = risks.aqi.risk.as_str(),
            "Classified current weather"
        );

        Ok(WeatherReport { snapshot, risks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskLevel;
    use crate::upstream::open_meteo::{AirQualityHourly, CurrentData, HourlyData};
    use async_trait::async_trait;

    struct FakeSource {
        current: Option<ForecastResponse>,
        air_quality: Option<AirQualityResponse>,
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current(&self, _coords: Coordinates) -> Result<ForecastResponse> {
            self.current
                .clone()
                .ok_or_else(|| ClimateError::transport("open-meteo", "connection reset"))
        }

        async fn air_quality(&self, _coords: Coordinates) -> Result<AirQualityResponse> {
            self.air_quality
                .clone()
                .ok_or_else(|| ClimateError::status("open-meteo-air-quality", 503))
        }

        async fn daily(&self, _coords: Coordinates, _days: u8) -> Result<ForecastResponse> {
            Ok(ForecastResponse::default())
        }
    }

    fn mumbai() -> Coordinates {
        Coordinates {
            latitude: 19.076,
            longitude: 72.8777,
        }
    }

    fn forecast(temperature: f64, humidity: f64, uv: f64, rain: Option<f64>) -> ForecastResponse {
        ForecastResponse {
            current: Some(CurrentData {
                temperature_2m: Some(temperature),
                relative_humidity_2m: Some(humidity),
                wind_speed_10m: Some(11.2),
                uv_index: Some(uv),
                weather_code: Some(61),
            }),
            hourly: Some(HourlyData {
                time: vec!["2025-06-01T00:00".into()],
                temperature_2m: Some(vec![Some(temperature)]),
                precipitation_probability: Some(vec![rain]),
            }),
            ..ForecastResponse::default()
        }
    }

    fn air(aqi: f64) -> AirQualityResponse {
        AirQualityResponse {
            hourly: Some(AirQualityHourly {
                time: vec!["2025-06-01T00:00".into()],
                us_aqi: Some(vec![Some(aqi), Some(20.0)]),
                ..AirQualityHourly::default()
            }),
        }
    }

    #[test]
    fn test_feels_like_adjustment() {
        assert_eq!(feels_like(30.0, 71.0), 32);
        assert_eq!(feels_like(30.0, 70.0), 29);
        assert_eq!(feels_like(24.6, 80.0), 27);
        assert_eq!(feels_like(0.5, 50.0), 0);
    }

    #[test]
    fn test_snapshot_requires_current_block() {
        let result = snapshot_from(&ForecastResponse::default());
        assert!(matches!(result, Err(ClimateError::UpstreamShape { .. })));
    }

    #[test]
    fn test_snapshot_defaults_missing_rain_probability() {
        let snapshot = snapshot_from(&forecast(22.4, 55.0, 2.0, None)).unwrap();
        assert_eq!(snapshot.rain_probability, 0);
        assert_eq!(snapshot.temperature, 22);
        assert_eq!(snapshot.feels_like, 21);
        assert_eq!(snapshot.weather_code, 61);
    }

    #[tokio::test]
    async fn test_get_weather_classifies_risks() {
        let service = WeatherService::new(Arc::new(FakeSource {
            current: Some(forecast(33.2, 82.0, 9.3, Some(75.0))),
            air_quality: Some(air(151.0)),
        }));

        let report = service.get_weather(mumbai()).await.unwrap();
        assert_eq!(report.snapshot.temperature, 33);
        assert_eq!(report.snapshot.feels_like, 35);
        assert_eq!(report.risks.rain.risk, RiskLevel::High);
        assert_eq!(report.risks.uv.risk, RiskLevel::Extreme);
        assert_eq!(report.risks.aqi.risk, RiskLevel::High);
        assert_eq!(report.risks.aqi.value, 151.0);
    }

    #[tokio::test]
    async fn test_air_quality_failure_defaults_to_zero() {
        let service = WeatherService::new(Arc::new(FakeSource {
            current: Some(forecast(20.0, 40.0, 1.0, Some(10.0))),
            air_quality: None,
        }));

        let report = service.get_weather(mumbai()).await.unwrap();
        assert_eq!(report.risks.aqi.value, 0.0);
        assert_eq!(report.risks.aqi.risk, RiskLevel::Low);
        assert_eq!(report.risks.aqi.description, "Air Quality Index: 0 (Good)");
    }

    #[tokio::test]
    async fn test_weather_failure_is_fatal() {
        let service = WeatherService::new(Arc::new(FakeSource {
            current: None,
            air_quality: Some(air(40.0)),
        }));

        let result = service.get_weather(mumbai()).await;
        assert!(matches!(
            result,
            Err(ClimateError::UpstreamTransport { .. })
        ));
    }
}
