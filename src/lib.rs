//! `ClimateWise` - Weather, air-quality and AI advisory backend
//!
//! This library resolves the caller's location, classifies current weather
//! hazards, formats multi-day forecasts and generates weather-aware advice
//! through a chat-completion model. Every external API sits behind a trait in
//! [`upstream`] so the services can run against fakes.

pub mod advisory;
pub mod api;
pub mod config;
pub mod error;
pub mod forecast;
pub mod location_resolver;
pub mod models;
pub mod risk;
pub mod telemetry;
pub mod upstream;
pub mod weather;
pub mod web;

// Re-export core types for public API
pub use advisory::AdvisoryService;
pub use api::AppState;
pub use config::AppConfig;
pub use error::ClimateError;
pub use forecast::ForecastService;
pub use location_resolver::LocationResolver;
pub use models::{Coordinates, ForecastReport, LocationRecord, WeatherReport};
pub use weather::WeatherService;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, ClimateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert_eq!(VERSION, "1.0.0");
    }
}
