//! Multi-day forecast formatting

use std::sync::Arc;

use tracing::{info, instrument, warn};

use crate::Result;
use crate::models::weather::round_half_up;
use crate::models::{Coordinates, ForecastDay, ForecastPeriod, ForecastReport};
use crate::upstream::WeatherSource;
use crate::upstream::open_meteo::{DailyData, sample};

/// Reshape the daily block into per-day records.
///
/// Values are aligned by position with the date list; anything missing at an
/// index reads as 0. Order is the provider's.
#[must_use]
pub fn days_from(daily: &DailyData, dates: &[String]) -> Vec<ForecastDay> {
    dates
        .iter()
        .enumerate()
        .map(|(index, date)| ForecastDay {
            date: date.clone(),
            temp_max: round_half_up(sample(&daily.temperature_2m_max, index).unwrap_or(0.0)),
            temp_min: round_half_up(sample(&daily.temperature_2m_min, index).unwrap_or(0.0)),
            precipitation: sample(&daily.precipitation_sum, index).unwrap_or(0.0),
            uv_index: sample(&daily.uv_index_max, index).unwrap_or(0.0),
            wind_speed: sample(&daily.wind_speed_10m_max, index).unwrap_or(0.0),
        })
        .collect()
}

/// Service behind `/api/forecast`
pub struct ForecastService {
    source: Arc<dyn WeatherSource>,
}

impl ForecastService {
    #[must_use]
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        Self { source }
    }

    /// Fetch the forecast for `period`, echoing the requested period name.
    ///
    /// A response without a daily time series is not an error: the report
    /// comes back with no data and no confidence.
    ///
    /// # Errors
    ///
    /// Returns an upstream error when the provider call itself fails
    #[instrument(skip(self), fields(coordinates = %coords.format_coordinates()))]
    pub async fn get_forecast(&self, coords: Coordinates, period: &str) -> Result<ForecastReport> {
        let parsed = ForecastPeriod::parse(period);
        let response = self.source.daily(coords, parsed.horizon_days()).await?;

        let Some((daily, dates)) = response
            .daily
            .as_ref()
            .and_then(|daily| daily.time.as_ref().map(|dates| (daily, dates)))
        else {
            warn!("No daily series returned for {} forecast", period);
            return Ok(ForecastReport::empty(period));
        };

        let data = days_from(daily, dates);
        info!("Formatted {} forecast days for {}", data.len(), period);

        Ok(ForecastReport {
            period: period.to_string(),
            data,
            confidence: Some(parsed.confidence()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClimateError;
    use crate::upstream::open_meteo::{AirQualityResponse, ForecastResponse};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves a daily series of the requested length and records the horizon
    struct FakeSource {
        with_series: bool,
        requested_days: Mutex<Vec<u8>>,
    }

    impl FakeSource {
        fn new(with_series: bool) -> Self {
            Self {
                with_series,
                requested_days: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl WeatherSource for FakeSource {
        async fn current(&self, _coords: Coordinates) -> crate::Result<ForecastResponse> {
            Err(ClimateError::shape("open-meteo", "unused"))
        }

        async fn air_quality(&self, _coords: Coordinates) -> crate::Result<AirQualityResponse> {
            Err(ClimateError::shape("open-meteo-air-quality", "unused"))
        }

        async fn daily(&self, _coords: Coordinates, days: u8) -> crate::Result<ForecastResponse> {
            self.requested_days.lock().unwrap().push(days);
            if !self.with_series {
                return Ok(ForecastResponse::default());
            }
            let n = usize::from(days);
            Ok(ForecastResponse {
                daily: Some(DailyData {
                    time: Some((1..=n).map(|d| format!("2025-07-{d:02}")).collect()),
                    temperature_2m_max: Some((0..n).map(|d| Some(30.5 + d as f64)).collect()),
                    temperature_2m_min: Some((0..n).map(|_| Some(24.4)).collect()),
                    precipitation_sum: Some((0..n).map(|_| Some(1.2)).collect()),
                    uv_index_max: Some((0..n).map(|_| Some(7.25)).collect()),
                    wind_speed_10m_max: None,
                }),
                ..ForecastResponse::default()
            })
        }
    }

    fn coords() -> Coordinates {
        Coordinates {
            latitude: 19.076,
            longitude: 72.8777,
        }
    }

    #[test]
    fn test_days_from_defaults_missing_values() {
        let daily = DailyData {
            time: None,
            temperature_2m_max: Some(vec![Some(31.5), None]),
            temperature_2m_min: Some(vec![Some(-0.5)]),
            precipitation_sum: Some(vec![None, Some(4.2)]),
            uv_index_max: None,
            wind_speed_10m_max: Some(vec![Some(18.0)]),
        };
        let dates = vec!["2025-07-01".to_string(), "2025-07-02".to_string()];
        let days = days_from(&daily, &dates);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].temp_max, 32);
        assert_eq!(days[0].temp_min, 0);
        assert_eq!(days[0].precipitation, 0.0);
        assert_eq!(days[0].wind_speed, 18.0);
        assert_eq!(days[1].date, "2025-07-02");
        assert_eq!(days[1].temp_max, 0);
        assert_eq!(days[1].precipitation, 4.2);
        assert_eq!(days[1].uv_index, 0.0);
    }

    #[tokio::test]
    async fn test_weekly_forecast_matches_horizon() {
        let source = Arc::new(FakeSource::new(true));
        let service = ForecastService::new(source.clone());

        let report = service.get_forecast(coords(), "weekly").await.unwrap();
        assert_eq!(report.period, "weekly");
        assert_eq!(report.data.len(), 7);
        assert_eq!(report.confidence, Some(80));
        assert_eq!(report.data[0].date, "2025-07-01");
        assert_eq!(report.data[6].date, "2025-07-07");
        assert_eq!(report.data[2].temp_max, 33);
        assert_eq!(*source.requested_days.lock().unwrap(), vec![7]);
    }

    #[tokio::test]
    async fn test_monthly_and_yearly_share_horizon() {
        let source = Arc::new(FakeSource::new(true));
        let service = ForecastService::new(source.clone());

        let monthly = service.get_forecast(coords(), "monthly").await.unwrap();
        let yearly = service.get_forecast(coords(), "yearly").await.unwrap();
        assert_eq!(monthly.confidence, Some(70));
        assert_eq!(yearly.confidence, Some(60));
        assert_eq!(monthly.data.len(), 16);
        assert_eq!(yearly.data.len(), 16);
        assert_eq!(*source.requested_days.lock().unwrap(), vec![16, 16]);
    }

    #[tokio::test]
    async fn test_missing_series_soft_fails() {
        let service = ForecastService::new(Arc::new(FakeSource::new(false)));

        let report = service.get_forecast(coords(), "daily").await.unwrap();
        assert_eq!(report.period, "daily");
        assert!(report.data.is_empty());
        assert_eq!(report.confidence, None);
    }

    #[tokio::test]
    async fn test_unrecognized_period_uses_daily_horizon() {
        let source = Arc::new(FakeSource::new(true));
        let service = ForecastService::new(source.clone());

        let report = service.get_forecast(coords(), "fortnightly").await.unwrap();
        assert_eq!(report.period, "fortnightly");
        assert_eq!(report.data.len(), 1);
        assert_eq!(report.confidence, Some(90));
    }
}
