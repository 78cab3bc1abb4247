//! Data models for the ClimateWise backend
//!
//! This module contains the core domain models organized by concern:
//! - Location: coordinates, normalized location records, city search hits
//! - Weather: current snapshot and per-hazard risk assessment
//! - Forecast: period mapping and per-day records
//! - Advisory: AI request context, report envelope and fallback payloads

pub mod advisory;
pub mod forecast;
pub mod location;
pub mod weather;

// Re-export all public types for convenient access
pub use advisory::{
    AiSuggestion, InsightLocation, InsightsReport, InsightsRequest, SimulationInput,
    SimulationResult, SimulatorRequest, SuggestionsRequest, UserProfile, WeatherContext,
};
pub use forecast::{ForecastDay, ForecastPeriod, ForecastReport};
pub use location::{CityMatch, Coordinates, LocationRecord};
pub use weather::{RiskAssessment, RiskLevel, WeatherReport, WeatherSnapshot};
