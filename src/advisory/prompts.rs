//! Prompt builders for the advisory endpoints
//!
//! Missing profile fields render as `unknown`, missing weather numbers as `0`.
//! A value counts as missing when it is absent, `null`, `false`, `0` or an empty
//! string.

use serde_json::Value;

use crate::models::{InsightLocation, SimulationInput, UserProfile, WeatherContext};

const UNKNOWN: &str = "unknown";

/// Render a free-form profile value, `unknown` when missing
fn profile_field(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null | Value::Bool(false)) => UNKNOWN.to_string(),
        Some(Value::String(s)) if s.is_empty() => UNKNOWN.to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => UNKNOWN.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Render a weather number, `0` when missing
fn number(value: Option<f64>) -> f64 {
    value.filter(|v| *v != 0.0 && !v.is_nan()).unwrap_or(0.0)
}

/// Signed rendering used for scenario deltas: `+2`, `-1.5`, `0`
fn signed(value: Option<f64>) -> String {
    let value = number(value);
    if value > 0.0 {
        format!("+{value}")
    } else {
        format!("{value}")
    }
}

fn profile_block(profile: &UserProfile) -> String {
    format!(
        "User Profile:\n- Age: {}\n- Gender: {}\n- Occupation: {}\n",
        profile_field(profile.age.as_ref()),
        profile_field(profile.gender.as_ref()),
        profile_field(profile.occupation.as_ref()),
    )
}

fn weather_block(weather: &WeatherContext, aqi_label: &str) -> String {
    format!(
        "Current Weather:\n\
         - Temperature: {}°C\n\
         - Feels Like: {}°C\n\
         - Humidity: {}%\n\
         - UV Index: {}\n\
         - Rain Probability: {}%\n\
         - {aqi_label}: {}\n",
        number(weather.temperature),
        number(weather.feels_like),
        number(weather.humidity),
        number(weather.uv_index),
        number(weather.rain_probability),
        number(Some(weather.aqi_value())),
    )
}

#[must_use]
pub fn suggestions_prompt(profile: &UserProfile, weather: &WeatherContext) -> String {
    format!(
        "You are an AI assistant that generates **personalized, weather-aware climate suggestions**.\n\
         Base your advice on the data below and respond ONLY in strict JSON (no extra text, no markdown).\n\n\
         {profile}\n\
         {weather}\n\
         Return exactly 3-4 suggestions in this JSON format:\n\
         [\n  {{\n    \"id\": \"unique-id\",\n    \"type\": \"energy|health|safety|timing|general\",\n    \
         \"title\": \"Short title\",\n    \"content\": \"Actionable recommendation based on weather\",\n    \
         \"icon\": \"fas fa-icon-name\"\n  }}\n]\n",
        profile = profile_block(profile),
        weather = weather_block(weather, "Air Quality Index (AQI)"),
    )
}

#[must_use]
pub fn insights_prompt(
    location: &InsightLocation,
    weather: &WeatherContext,
    profile: &UserProfile,
) -> String {
    let text = |value: &Option<String>| {
        value
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string()
    };

    format!(
        "You are an AI climate analyst. Based on the following data, generate 3-4 JSON insights about the current climate conditions.\n\
         Return ONLY valid JSON array.\n\n\
         {profile}\n\
         Location:\n\
         - City: {city}\n\
         - Country: {country}\n\
         - Latitude: {latitude}\n\
         - Longitude: {longitude}\n\n\
         {weather}\n\
         Respond ONLY with JSON in this format:\n\
         [\n  {{\n    \"id\": \"unique-id\",\n    \"title\": \"Short title\",\n    \
         \"content\": \"Insight description\",\n    \"severity\": \"info|warning|critical\",\n    \
         \"category\": \"temperature|precipitation|air-quality|uv|general\",\n    \
         \"confidence\": 0-100,\n    \"timeframe\": \"time context\"\n  }}\n]\n",
        profile = profile_block(profile),
        city = text(&location.city),
        country = text(&location.country),
        latitude = location.latitude.unwrap_or(0.0),
        longitude = location.longitude.unwrap_or(0.0),
        weather = weather_block(weather, "Air Quality Index"),
    )
}

#[must_use]
pub fn simulation_prompt(
    input: &SimulationInput,
    profile: &UserProfile,
    weather: &WeatherContext,
) -> String {
    format!(
        "You are an AI climate impact simulation expert.\n\
         Analyze the scenario below and provide weather-aware insights.\n\n\
         {profile}\n\
         {weather}\
         - Wind Speed: {wind} km/h\n\n\
         Simulation Adjustments:\n\
         - Temperature Change: {temperature}°C\n\
         - Rainfall Change: {rainfall}%\n\n\
         Return ONLY valid JSON in this format:\n\
         {{\n  \"impact\": \"Brief weather-aware impact summary\",\n  \"recommendations\": [\n    \
         \"Recommendation 1 (specific to weather and simulation changes)\",\n    \
         \"Recommendation 2\",\n    \"Recommendation 3\"\n  ],\n  \"healthRisks\": [\n    \
         \"Health risk 1\",\n    \"Health risk 2\"\n  ]\n}}",
        profile = profile_block(profile),
        weather = weather_block(weather, "Air Quality Index"),
        wind = number(weather.wind_speed),
        temperature = signed(input.temperature_change),
        rainfall = signed(input.rainfall_change),
    )
}
