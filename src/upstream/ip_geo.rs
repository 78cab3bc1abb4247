//! IP geolocation providers
//!
//! Each provider has its own response schema and failure marker, so the mapping
//! into [`LocationRecord`] is written out per provider. The resolver tries them
//! in the order returned by [`default_ip_providers`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::instrument;

use super::fetch_json;
use crate::Result;
use crate::models::LocationRecord;
use crate::models::location::parse_or_zero;

/// One IP geolocation service
#[async_trait]
pub trait IpGeoProvider: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Look up an IP address.
    ///
    /// `Ok(None)` means the provider answered but the answer is unusable: its
    /// failure marker is set, or it names neither a city nor a country.
    async fn try_resolve(&self, ip: &str) -> Result<Option<LocationRecord>>;
}

/// Providers in priority order: ipapi.co, ip-api.com, ipinfo.io
#[must_use]
pub fn default_ip_providers(client: &Client) -> Vec<Arc<dyn IpGeoProvider>> {
    let providers: [Arc<dyn IpGeoProvider>; 3] = [
        Arc::new(IpapiCo::new(client.clone())),
        Arc::new(IpApiCom::new(client.clone())),
        Arc::new(IpinfoIo::new(client.clone())),
    ];
    providers.into()
}

fn usable(record: LocationRecord) -> Option<LocationRecord> {
    record.is_usable().then_some(record)
}

// ============================================================================
// ipapi.co
// ============================================================================

pub struct IpapiCo {
    client: Client,
}

impl IpapiCo {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct IpapiCoResponse {
    #[serde(default)]
    pub error: bool,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    pub country_name: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

impl IpapiCoResponse {
    fn into_record(self) -> Option<LocationRecord> {
        if self.error {
            return None;
        }
        usable(LocationRecord::resolved(
            self.city.unwrap_or_default(),
            self.region.unwrap_or_default(),
            self.country
                .filter(|code| !code.is_empty())
                .or(self.country_name)
                .unwrap_or_default(),
            (self.latitude.unwrap_or(0.0), self.longitude.unwrap_or(0.0)),
            self.timezone.unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl IpGeoProvider for IpapiCo {
    fn name(&self) -> &'static str {
        "ipapi.co"
    }

    #[instrument(skip(self))]
    async fn try_resolve(&self, ip: &str) -> Result<Option<LocationRecord>> {
        let url = format!("https://ipapi.co/{}/json/", urlencoding::encode(ip));
        let response: IpapiCoResponse = fetch_json(self.name(), self.client.get(url)).await?;
        Ok(response.into_record())
    }
}

// ============================================================================
// ip-api.com
// ============================================================================

pub struct IpApiCom {
    client: Client,
}

impl IpApiCom {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct IpApiComResponse {
    pub status: Option<String>,
    pub city: Option<String>,
    pub region_name: Option<String>,
    pub country: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub timezone: Option<String>,
}

impl IpApiComResponse {
    fn into_record(self) -> Option<LocationRecord> {
        if self.status.as_deref() == Some("fail") {
            return None;
        }
        usable(LocationRecord::resolved(
            self.city.unwrap_or_default(),
            self.region_name.unwrap_or_default(),
            self.country.unwrap_or_default(),
            (self.lat.unwrap_or(0.0), self.lon.unwrap_or(0.0)),
            self.timezone.unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl IpGeoProvider for IpApiCom {
    fn name(&self) -> &'static str {
        "ip-api.com"
    }

    #[instrument(skip(self))]
    async fn try_resolve(&self, ip: &str) -> Result<Option<LocationRecord>> {
        // The free tier is plain HTTP only
        let url = format!(
            "http://ip-api.com/json/{}?fields=status,country,regionName,city,lat,lon,timezone",
            urlencoding::encode(ip)
        );
        let response: IpApiComResponse = fetch_json(self.name(), self.client.get(url)).await?;
        Ok(response.into_record())
    }
}

// ============================================================================
// ipinfo.io
// ============================================================================

pub struct IpinfoIo {
    client: Client,
}

impl IpinfoIo {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct IpinfoIoResponse {
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
    /// "lat,lon"
    pub loc: Option<String>,
    pub timezone: Option<String>,
}

impl IpinfoIoResponse {
    fn into_record(self) -> Option<LocationRecord> {
        let mut parts = self.loc.as_deref().unwrap_or_default().splitn(2, ',');
        let latitude = parse_or_zero(parts.next());
        let longitude = parse_or_zero(parts.next());
        usable(LocationRecord::resolved(
            self.city.unwrap_or_default(),
            self.region.unwrap_or_default(),
            self.country.unwrap_or_default(),
            (latitude, longitude),
            self.timezone.unwrap_or_default(),
        ))
    }
}

#[async_trait]
impl IpGeoProvider for IpinfoIo {
    fn name(&self) -> &'static str {
        "ipinfo.io"
    }

    #[instrument(skip(self))]
    async fn try_resolve(&self, ip: &str) -> Result<Option<LocationRecord>> {
        let url = format!("https://ipinfo.io/{}/json", urlencoding::encode(ip));
        let response: IpinfoIoResponse = fetch_json(self.name(), self.client.get(url)).await?;
        Ok(response.into_record())
    }
}
