use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::{
    ClimateError,
    advisory::AdvisoryService,
    config::AppConfig,
    forecast::ForecastService,
    location_resolver::LocationResolver,
    models::{
        CityMatch, Coordinates, ForecastReport, InsightsReport, InsightsRequest, LocationRecord,
        SimulatorRequest, SuggestionsRequest, WeatherReport, location::parse_finite,
    },
    upstream::{
        Geocoder, GroqProvider, NominatimClient, OpenMeteoClient, WeatherSource, build_client,
        default_ip_providers,
    },
    weather::WeatherService,
};

pub mod extract;

pub use extract::ClientIp;

pub const APP_NAME: &str = "ClimateWise Backend";

const LOCATION_FAILED: &str = "Failed to detect location";
const WEATHER_FAILED: &str = "Failed to fetch weather data";
const WEATHER_INVALID: &str = "Invalid weather data received";
const SEARCH_FAILED: &str = "Failed to search cities";
const FORECAST_FAILED: &str = "Failed to fetch forecast data";
const SUGGESTIONS_FAILED: &str = "Failed to generate AI suggestions";
const INSIGHTS_FAILED: &str = "Failed to generate climate insights";
const SIMULATION_FAILED: &str = "Failed to run climate simulation";

/// Services shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<LocationResolver>,
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<WeatherService>,
    pub forecast: Arc<ForecastService>,
    pub advisory: Arc<AdvisoryService>,
    /// Used per component when `lat`/`lon` are omitted
    pub default_coordinates: Coordinates,
}

impl AppState {
    /// Wire the production adapters from configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the shared HTTP client cannot be built
    pub fn from_config(config: &AppConfig) -> crate::Result<Self> {
        let client = build_client(&config.upstream)?;

        let geocoder: Arc<dyn Geocoder> = Arc::new(NominatimClient::new(
            client.clone(),
            config.upstream.nominatim_base_url.clone(),
        ));
        let weather_source: Arc<dyn WeatherSource> = Arc::new(OpenMeteoClient::new(
            client.clone(),
            config.upstream.open_meteo_base_url.clone(),
            config.upstream.air_quality_base_url.clone(),
        ));
        let completions = Arc::new(GroqProvider::new(
            client.clone(),
            config.groq.api_key.clone(),
            config.groq.base_url.clone(),
            config.groq.model.clone(),
        ));

        Ok(Self {
            locations: Arc::new(LocationResolver::new(
                geocoder.clone(),
                default_ip_providers(&client),
            )),
            geocoder,
            weather: Arc::new(WeatherService::new(weather_source.clone())),
            forecast: Arc::new(ForecastService::new(weather_source)),
            advisory: Arc::new(AdvisoryService::new(completions)),
            default_coordinates: config.defaults.coordinates,
        })
    }
}

/// JSON error body `{ "error": ... }` with a status derived from the error kind.
///
/// Upstream and configuration failures reach the caller only as the endpoint's
/// generic message; the detail goes to the log.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(err: ClimateError, generic: &str) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let message = match &err {
            ClimateError::Validation { .. } | ClimateError::ModelParse { .. } => {
                err.user_message()
            }
            _ => generic.to_string(),
        };

        if status.is_server_error() {
            error!("{}: {}", generic, err);
        } else {
            warn!("Rejected request: {}", err);
        }

        Self { status, message }
    }

    /// Maps a [`ClimateError`] using `generic` as the caller-facing message
    pub fn with(generic: &'static str) -> impl FnOnce(ClimateError) -> Self {
        move |err| Self::new(err, generic)
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!("Rejected request body: {}", rejection.body_text());
        Self {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

/// Weather failures: a missing `current` block gets its own message
fn weather_error(err: ClimateError) -> ApiError {
    let generic = match &err {
        ClimateError::UpstreamShape { .. } => WEATHER_INVALID,
        _ => WEATHER_FAILED,
    };
    ApiError::new(err, generic)
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

/// Raw `lat`, `lon` and `period` query values
#[derive(Debug, Default, Deserialize)]
pub struct CoordinateQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub period: Option<String>,
}

impl CoordinateQuery {
    /// Coordinates for the weather and forecast paths.
    ///
    /// Each omitted or empty component falls back independently. `None` when a
    /// component is present but not a finite number: no provider can answer
    /// for it, so callers treat it like an empty upstream response.
    fn coordinates_or(&self, fallback: Coordinates) -> Option<Coordinates> {
        let latitude = optional_number(self.lat.as_deref())?;
        let longitude = optional_number(self.lon.as_deref())?;
        Some(Coordinates::with_fallback(latitude, longitude, fallback))
    }
}

/// `Some(None)` when absent or blank, `None` when present but unusable
fn optional_number(raw: Option<&str>) -> Option<Option<f64>> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Some(None),
        Some(value) => parse_finite(value).map(Some),
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/location", get(get_location))
        .route("/weather", get(get_weather))
        .route("/search/cities/{query}", get(search_cities))
        .route("/forecast", get(get_forecast))
        .route("/ai/suggestions", post(ai_suggestions))
        .route("/climate/insights", post(climate_insights))
        .route("/climate/simulator", post(climate_simulator))
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "app": APP_NAME,
        "version": crate::VERSION,
    }))
}

async fn get_location(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
    client_ip: ClientIp,
) -> Result<Json<LocationRecord>, ApiError> {
    let coords = Coordinates::from_query(query.lat.as_deref(), query.lon.as_deref());
    let location = state
        .locations
        .resolve(coords, client_ip.as_deref())
        .await
        .map_err(ApiError::with(LOCATION_FAILED))?;
    Ok(Json(location))
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<WeatherReport>, ApiError> {
    let coords = query
        .coordinates_or(state.default_coordinates)
        .ok_or_else(|| weather_error(unusable_coordinates(&query)))?;
    let report = state
        .weather
        .get_weather(coords)
        .await
        .map_err(weather_error)?;
    Ok(Json(report))
}

fn unusable_coordinates(query: &CoordinateQuery) -> ClimateError {
    ClimateError::shape(
        "query",
        format!(
            "coordinates are not numeric: lat={:?} lon={:?}",
            query.lat, query.lon
        ),
    )
}

async fn search_cities(
    State(state): State<AppState>,
    Path(query): Path<String>,
) -> Result<Json<Vec<CityMatch>>, ApiError> {
    let cities = state
        .geocoder
        .search_cities(&query)
        .await
        .map_err(ApiError::with(SEARCH_FAILED))?;
    Ok(Json(cities))
}

async fn get_forecast(
    State(state): State<AppState>,
    Query(query): Query<CoordinateQuery>,
) -> Result<Json<ForecastReport>, ApiError> {
    let period = query.period.as_deref().unwrap_or("daily");
    let Some(coords) = query.coordinates_or(state.default_coordinates) else {
        warn!("{}, no {} forecast", unusable_coordinates(&query), period);
        return Ok(Json(ForecastReport::empty(period)));
    };
    let report = state
        .forecast
        .get_forecast(coords, period)
        .await
        .map_err(ApiError::with(FORECAST_FAILED))?;
    Ok(Json(report))
}

async fn ai_suggestions(
    State(state): State<AppState>,
    payload: Result<Json<SuggestionsRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let suggestions = state
        .advisory
        .generate_suggestions(&request.profile, &request.weather)
        .await
        .map_err(ApiError::with(SUGGESTIONS_FAILED))?;
    Ok(Json(suggestions))
}

async fn climate_insights(
    State(state): State<AppState>,
    payload: Result<Json<InsightsRequest>, JsonRejection>,
) -> Result<Json<InsightsReport>, ApiError> {
    let Json(request) = payload?;
    let report = state
        .advisory
        .generate_insights(
            request.location.as_ref(),
            &request.weather,
            &request.user_profile,
        )
        .await
        .map_err(ApiError::with(INSIGHTS_FAILED))?;
    Ok(Json(report))
}

async fn climate_simulator(
    State(state): State<AppState>,
    payload: Result<Json<SimulatorRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(request) = payload?;
    let result = state
        .advisory
        .run_simulation(&request.input, &request.profile, &request.weather)
        .await
        .map_err(ApiError::with(SIMULATION_FAILED))?;
    Ok(Json(result))
}
