//! AI advisory generation
//!
//! Turns profile and weather context into a prompt, runs it through a
//! [`CompletionProvider`] and parses the model's answer as JSON. Any valid JSON
//! is passed through unchanged. Each endpoint has its own policy for answers
//! that are not JSON at all:
//!
//! - suggestions: fixed two-item fallback list
//! - insights: [`ClimateError::ModelParse`], surfaced as a 500
//! - simulation: fixed fallback result
//!
//! A failing provider call is always an error.

pub mod prompts;

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, instrument, warn};

use crate::models::{
    AiSuggestion, InsightLocation, InsightsReport, SimulationInput, SimulationResult,
    UserProfile, WeatherContext,
};
use crate::upstream::{CompletionProvider, CompletionRequest};
use crate::{ClimateError, Result};

pub const SUGGESTIONS_MAX_TOKENS: u32 = 1000;
pub const INSIGHTS_MAX_TOKENS: u32 = 800;
pub const SIMULATION_MAX_TOKENS: u32 = 800;

/// Remove Markdown code fences (optionally tagged `json`) anywhere in the text
#[must_use]
pub fn strip_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse fence-stripped model output as JSON
///
/// # Errors
///
/// Returns [`ClimateError::ModelParse`] when the text is not valid JSON
pub fn parse_model_output(raw: &str) -> Result<Value> {
    serde_json::from_str(&strip_fences(raw)).map_err(ClimateError::model_parse)
}

/// Number of entries when the answer is an array, for logging
fn entry_count(value: &Value) -> usize {
    value.as_array().map_or(1, Vec::len)
}

/// Advisory generator shared by the suggestion, insight and simulator endpoints
pub struct AdvisoryService {
    provider: Arc<dyn CompletionProvider>,
}

impl AdvisoryService {
    #[must_use]
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    /// Personalized suggestions, falling back to a fixed list when the answer
    /// is not JSON.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the completion call fails
    #[instrument(skip_all)]
    pub async fn generate_suggestions(
        &self,
        profile: &UserProfile,
        weather: &WeatherContext,
    ) -> Result<Value> {
        let prompt = prompts::suggestions_prompt(profile, weather);
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, SUGGESTIONS_MAX_TOKENS))
            .await?;

        match parse_model_output(&raw) {
            Ok(suggestions) => {
                info!("Generated {} suggestions", entry_count(&suggestions));
                Ok(suggestions)
            }
            Err(e) => {
                warn!("Serving fallback suggestions, {}: {}", e, raw);
                Ok(json!(AiSuggestion::fallback()))
            }
        }
    }

    /// Climate insights for a location. Both coordinates are required.
    ///
    /// # Errors
    ///
    /// - [`ClimateError::Validation`] when the location or either coordinate is missing
    /// - [`ClimateError::ModelParse`] when the answer is not JSON
    /// - the provider's error when the completion call fails
    #[instrument(skip_all)]
    pub async fn generate_insights(
        &self,
        location: Option<&InsightLocation>,
        weather: &WeatherContext,
        profile: &UserProfile,
    ) -> Result<InsightsReport> {
        let location = location
            .filter(|loc| loc.latitude.is_some() && loc.longitude.is_some())
            .ok_or_else(|| ClimateError::validation("Location is required"))?;

        let prompt = prompts::insights_prompt(location, weather, profile);
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, INSIGHTS_MAX_TOKENS))
            .await?;

        let insights = parse_model_output(&raw).inspect_err(|e| {
            warn!("Rejecting insights output, {}: {}", e, raw);
        })?;
        info!("Generated {} climate insights", entry_count(&insights));

        Ok(InsightsReport {
            insights,
            generated: chrono::Utc::now().timestamp_millis(),
        })
    }

    /// Scenario simulation, falling back to a fixed result when the answer is
    /// not JSON.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the completion call fails
    #[instrument(skip_all)]
    pub async fn run_simulation(
        &self,
        input: &SimulationInput,
        profile: &UserProfile,
        weather: &WeatherContext,
    ) -> Result<Value> {
        let prompt = prompts::simulation_prompt(input, profile, weather);
        let raw = self
            .provider
            .complete(&CompletionRequest::new(prompt, SIMULATION_MAX_TOKENS))
            .await?;

        Ok(parse_model_output(&raw).unwrap_or_else(|e| {
            warn!("Serving fallback simulation, {}: {}", e, raw);
            json!(SimulationResult::fallback())
        }))
    }
}
