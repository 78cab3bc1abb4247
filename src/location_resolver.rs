//! Location Resolution Module
//!
//! Resolves either explicit coordinates (one reverse-geocode lookup, failure is
//! fatal) or a caller IP (an ordered chain of IP geolocation providers, failure
//! is not) into a [`LocationRecord`].

use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::models::{Coordinates, LocationRecord};
use crate::upstream::{Geocoder, IpGeoProvider};

/// Service for resolving the caller's location
pub struct LocationResolver {
    geocoder: Arc<dyn Geocoder>,
    ip_providers: Vec<Arc<dyn IpGeoProvider>>,
}

impl LocationResolver {
    /// `ip_providers` are tried in the given order
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>, ip_providers: Vec<Arc<dyn IpGeoProvider>>) -> Self {
        Self {
            geocoder,
            ip_providers,
        }
    }

    /// Resolve a location from coordinates or, failing that, the client IP.
    ///
    /// # Errors
    ///
    /// Only the coordinate path can fail. IP resolution that finds nothing
    /// returns [`LocationRecord::unresolved`].
    #[instrument(skip(self))]
    pub async fn resolve(
        &self,
        coords: Option<Coordinates>,
        client_ip: Option<&str>,
    ) -> Result<LocationRecord> {
        match coords {
            Some(coords) => self.resolve_coordinates(coords).await,
            None => Ok(self.resolve_ip(client_ip).await),
        }
    }

    async fn resolve_coordinates(&self, coords: Coordinates) -> Result<LocationRecord> {
        debug!("Reverse geocoding {}", coords.format_coordinates());
        let location = self.geocoder.reverse(coords).await?;
        info!(
            "Resolved {} to '{}', '{}'",
            coords.format_coordinates(),
            location.city,
            location.country
        );
        Ok(location)
    }

    /// Try each provider strictly in order and stop at the first usable answer.
    ///
    /// Providers are never queried concurrently, so the winner is always the
    /// highest-priority provider that answered usefully.
    async fn resolve_ip(&self, client_ip: Option<&str>) -> LocationRecord {
        let Some(ip) = client_ip.map(str::trim).filter(|ip| !ip.is_empty()) else {
            warn!("No client IP available, returning unresolved location");
            return LocationRecord::unresolved();
        };

        for provider in &self.ip_providers {
            match provider.try_resolve(ip).await {
                Ok(Some(location)) => {
                    info!(
                        "Resolved IP via {} to '{}', '{}'",
                        provider.name(),
                        location.city,
                        location.country
                    );
                    return location;
                }
                Ok(None) => debug!("{} had no usable data for {}", provider.name(), ip),
                Err(e) => warn!("IP location service {} failed: {}", provider.name(), e),
            }
        }

        warn!(
            "All {} IP location services exhausted for {}",
            self.ip_providers.len(),
            ip
        );
        LocationRecord::unresolved()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClimateError;
    use crate::models::CityMatch;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeGeocoder {
        fail: bool,
    }

    #[async_trait]
    impl Geocoder for FakeGeocoder {
        async fn reverse(&self, coords: Coordinates) -> Result<LocationRecord> {
            if self.fail {
                return Err(ClimateError::status("nominatim", 503));
            }
            Ok(LocationRecord::resolved(
                "Pune".into(),
                "Maharashtra".into(),
                "India".into(),
                (coords.latitude, coords.longitude),
                String::new(),
            ))
        }

        async fn search_cities(&self, _query: &str) -> Result<Vec<CityMatch>> {
            Ok(Vec::new())
        }
    }

    enum Behaviour {
        Fail,
        Unusable,
        Usable(&'static str),
    }

    struct FakeProvider {
        name: &'static str,
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(name: &'static str, behaviour: Behaviour) -> Arc<Self> {
            Arc::new(Self {
                name,
                behaviour,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl IpGeoProvider for FakeProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn try_resolve(&self, _ip: &str) -> Result<Option<LocationRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behaviour {
                Behaviour::Fail => Err(ClimateError::transport(self.name, "timed out")),
                Behaviour::Unusable => Ok(None),
                Behaviour::Usable(city) => Ok(Some(LocationRecord::resolved(
                    city.into(),
                    String::new(),
                    "Germany".into(),
                    (52.52, 13.40),
                    "Europe/Berlin".into(),
                ))),
            }
        }
    }

    fn resolver(providers: Vec<Arc<dyn IpGeoProvider>>, geocoder_fails: bool) -> LocationResolver {
        LocationResolver::new(
            Arc::new(FakeGeocoder {
                fail: geocoder_fails,
            }),
            providers,
        )
    }

    #[tokio::test]
    async fn test_coordinates_use_reverse_geocoding() {
        let first = FakeProvider::new("first", Behaviour::Usable("Berlin"));
        let resolver = resolver(vec![first.clone()], false);
        let coords = Coordinates::new(18.52, 73.85).unwrap();

        let location = resolver.resolve(Some(coords), Some("8.8.8.8")).await.unwrap();
        assert_eq!(location.city, "Pune");
        assert_eq!(location.latitude, Some(18.52));
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_coordinate_failure_is_fatal() {
        let first = FakeProvider::new("first", Behaviour::Usable("Berlin"));
        let resolver = resolver(vec![first.clone()], true);
        let coords = Coordinates::new(18.52, 73.85).unwrap();

        let result = resolver.resolve(Some(coords), Some("8.8.8.8")).await;
        assert!(matches!(result, Err(ClimateError::UpstreamStatus { .. })));
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_first_usable_provider_wins() {
        let first = FakeProvider::new("first", Behaviour::Fail);
        let second = FakeProvider::new("second", Behaviour::Unusable);
        let third = FakeProvider::new("third", Behaviour::Usable("Hamburg"));
        let fourth = FakeProvider::new("fourth", Behaviour::Usable("Munich"));
        let resolver = resolver(
            vec![first.clone(), second.clone(), third.clone(), fourth.clone()],
            false,
        );

        let location = resolver.resolve(None, Some("203.0.113.7")).await.unwrap();
        assert_eq!(location.city, "Hamburg");
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 1);
        assert_eq!(third.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fourth.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_exhausted_chain_returns_unresolved() {
        let resolver = resolver(
            vec![
                FakeProvider::new("first", Behaviour::Fail),
                FakeProvider::new("second", Behaviour::Unusable),
                FakeProvider::new("third", Behaviour::Fail),
            ],
            false,
        );

        let location = resolver.resolve(None, Some("203.0.113.7")).await.unwrap();
        assert_eq!(location, LocationRecord::unresolved());
    }

    #[tokio::test]
    async fn test_missing_ip_skips_providers() {
        let first = FakeProvider::new("first", Behaviour::Usable("Berlin"));
        let resolver = resolver(vec![first.clone()], false);

        let location = resolver.resolve(None, Some("  ")).await.unwrap();
        assert_eq!(location, LocationRecord::unresolved());
        assert_eq!(first.calls.load(Ordering::SeqCst), 0);
    }
}
