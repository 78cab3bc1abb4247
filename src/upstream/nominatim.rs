//! Nominatim (OpenStreetMap) geocoding client

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

use super::fetch_json;
use crate::Result;
use crate::models::location::parse_finite;
use crate::models::{CityMatch, Coordinates, LocationRecord};

const PROVIDER: &str = "nominatim";

/// Forward and reverse geocoding
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve coordinates to a named place. The record echoes the given coordinates.
    async fn reverse(&self, coords: Coordinates) -> Result<LocationRecord>;

    /// Search cities by free-text query
    async fn search_cities(&self, query: &str) -> Result<Vec<CityMatch>>;
}

/// Nominatim API client
pub struct NominatimClient {
    client: Client,
    base_url: String,
}

impl NominatimClient {
    #[must_use]
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    #[instrument(skip(self), fields(lat = coords.latitude, lon = coords.longitude))]
    async fn reverse(&self, coords: Coordinates) -> Result<LocationRecord> {
        let url = format!(
            "{}/reverse?lat={}&lon={}&format=json",
            self.base_url, coords.latitude, coords.longitude
        );
        let response: ReverseResponse = fetch_json(PROVIDER, self.client.get(url)).await?;
        Ok(record_from_reverse(response, coords))
    }

    #[instrument(skip(self))]
    async fn search_cities(&self, query: &str) -> Result<Vec<CityMatch>> {
        let url = format!(
            "{}/search?q={}&format=json&limit=10&featuretype=city",
            self.base_url,
            urlencoding::encode(query)
        );
        let places: Vec<SearchPlace> = fetch_json(PROVIDER, self.client.get(url)).await?;
        info!("Found {} cities for '{}'", places.len(), query);
        Ok(places.into_iter().map(CityMatch::from).collect())
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct ReverseResponse {
    #[serde(default)]
    pub address: Option<Address>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Address {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchPlace {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub lat: Option<String>,
    #[serde(default)]
    pub lon: Option<String>,
}

impl From<SearchPlace> for CityMatch {
    fn from(place: SearchPlace) -> Self {
        Self {
            name: place.display_name,
            lat: place.lat.as_deref().and_then(parse_finite),
            lon: place.lon.as_deref().and_then(parse_finite),
        }
    }
}

fn first_non_empty(candidates: &[&Option<String>]) -> String {
    candidates
        .iter()
        .filter_map(|c| c.as_deref())
        .find(|c| !c.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// City falls back through town, village and state
fn record_from_reverse(response: ReverseResponse, coords: Coordinates) -> LocationRecord {
    let address = response.address.unwrap_or_default();
    LocationRecord::resolved(
        first_non_empty(&[
            &address.city,
            &address.town,
            &address.village,
            &address.state,
        ]),
        address.state.unwrap_or_default(),
        address.country.unwrap_or_default(),
        (coords.latitude, coords.longitude),
        address.timezone.unwrap_or_default(),
    )
}
