//! AI advisory models: request context and the JSON shapes returned by the model

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::location::parse_finite;

/// Accept a JSON number or a numeric string; anything else reads as absent.
///
/// Form inputs often post numbers as strings (`"temperatureChange": "2"`).
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => parse_finite(&s),
        _ => None,
    })
}

/// User profile as sent by the client. Values are free-form.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct UserProfile {
    #[serde(default)]
    pub age: Option<Value>,
    #[serde(default)]
    pub gender: Option<Value>,
    #[serde(default)]
    pub occupation: Option<Value>,
}

/// Weather context echoed back by the client, usually a previous `/api/weather` body
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct WeatherContext {
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub feels_like: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub humidity: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub uv_index: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub rain_probability: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub wind_speed: Option<f64>,
    #[serde(default)]
    pub risks: Option<RiskContext>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct RiskContext {
    #[serde(default)]
    pub aqi: Option<AqiContext>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AqiContext {
    #[serde(default, deserialize_with = "lenient_number")]
    pub value: Option<f64>,
}

impl WeatherContext {
    /// AQI value from the nested risks object, 0 when absent
    #[must_use]
    pub fn aqi_value(&self) -> f64 {
        self.risks
            .as_ref()
            .and_then(|risks| risks.aqi.as_ref())
            .and_then(|aqi| aqi.value)
            .unwrap_or(0.0)
    }
}

/// Location sent with an insights request
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct InsightLocation {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
}

/// Scenario adjustments for the climate simulator
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SimulationInput {
    /// Temperature delta in Celsius
    #[serde(default, deserialize_with = "lenient_number")]
    pub temperature_change: Option<f64>,
    /// Rainfall delta in percent
    #[serde(default, deserialize_with = "lenient_number")]
    pub rainfall_change: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
pub struct SuggestionsRequest {
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub weather: WeatherContext,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    #[serde(default)]
    pub location: Option<InsightLocation>,
    #[serde(default)]
    pub weather: WeatherContext,
    #[serde(default)]
    pub user_profile: UserProfile,
}

#[derive(Debug, Deserialize, Default)]
pub struct SimulatorRequest {
    #[serde(default)]
    pub input: SimulationInput,
    #[serde(default)]
    pub profile: UserProfile,
    #[serde(default)]
    pub weather: WeatherContext,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionType {
    Energy,
    Health,
    Safety,
    Timing,
    General,
}

/// A personalized, weather-aware suggestion.
///
/// Model answers are passed through as JSON; this shape backs the fallback list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AiSuggestion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub title: String,
    pub content: String,
    pub icon: String,
}

impl AiSuggestion {
    /// Suggestions served when the model output cannot be parsed
    #[must_use]
    pub fn fallback() -> Vec<AiSuggestion> {
        vec![
            AiSuggestion {
                id: "fallback-1".to_string(),
                kind: SuggestionType::Health,
                title: "Stay Hydrated".to_string(),
                content: "Drink enough water due to current weather conditions.".to_string(),
                icon: "fas fa-tint".to_string(),
            },
            AiSuggestion {
                id: "fallback-2".to_string(),
                kind: SuggestionType::Safety,
                title: "Carry Umbrella".to_string(),
                content: "Rain probability detected, carry an umbrella if you go outside."
                    .to_string(),
                icon: "fas fa-umbrella".to_string(),
            },
        ]
    }
}

/// Body of `/api/climate/insights`
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct InsightsReport {
    /// Model output as parsed, normally an array of insight objects
    pub insights: Value,
    /// Unix epoch milliseconds
    pub generated: i64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub impact: String,
    pub recommendations: Vec<String>,
    pub health_risks: Vec<String>,
}

impl SimulationResult {
    /// Result served when the model output cannot be parsed
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            impact: "Weather-aware climate simulation fallback result".to_string(),
            recommendations: vec![
                "Stay hydrated and monitor weather changes".to_string(),
                "Avoid prolonged sun exposure".to_string(),
                "Adjust outdoor plans based on rainfall probability".to_string(),
            ],
            health_risks: vec!["Heat stress".to_string(), "UV exposure".to_string()],
        }
    }
}
