//! Location models: coordinates and the normalized location record

use serde::{Deserialize, Serialize};

/// Geographic coordinates in decimal degrees
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting non-finite values
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Build coordinates from raw query values; both must be present and parse
    #[must_use]
    pub fn from_query(lat: Option<&str>, lon: Option<&str>) -> Option<Self> {
        let latitude = parse_finite(lat?)?;
        let longitude = parse_finite(lon?)?;
        Self::new(latitude, longitude)
    }

    /// Fill each missing component from `fallback` independently
    #[must_use]
    pub fn with_fallback(lat: Option<f64>, lon: Option<f64>, fallback: Coordinates) -> Self {
        Self {
            latitude: lat.unwrap_or(fallback.latitude),
            longitude: lon.unwrap_or(fallback.longitude),
        }
    }

    /// Format coordinates for logging
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Parse a raw string into a finite float
#[must_use]
pub fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a raw string into a float, treating anything unusable as zero
#[must_use]
pub fn parse_or_zero(raw: Option<&str>) -> f64 {
    raw.and_then(parse_finite).unwrap_or(0.0)
}

/// Normalized location returned by `/api/location`
///
/// A resolved record always carries `region` and `timezone` strings. The
/// unresolved record omits `region` and reports `timezone` as `null`, which is
/// what clients of the IP fallback have always received.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct LocationRecord {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
}

impl LocationRecord {
    /// Create a resolved record
    #[must_use]
    pub fn resolved(
        city: String,
        region: String,
        country: String,
        coordinates: (f64, f64),
        timezone: String,
    ) -> Self {
        Self {
            city,
            region: Some(region),
            country,
            latitude: Some(coordinates.0),
            longitude: Some(coordinates.1),
            timezone: Some(timezone),
        }
    }

    /// Record returned when every IP provider came up empty
    #[must_use]
    pub fn unresolved() -> Self {
        Self::default()
    }

    /// A provider answer is usable when it names at least a city or a country
    #[must_use]
    pub fn is_usable(&self) -> bool {
        !self.city.is_empty() || !self.country.is_empty()
    }
}

/// One entry of a city search
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CityMatch {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_coordinates_from_query() {
        let coords = Coordinates::from_query(Some("19.07"), Some(" 72.87")).unwrap();
        assert_eq!(coords.latitude, 19.07);
        assert_eq!(coords.longitude, 72.87);

        assert!(Coordinates::from_query(Some("19.07"), None).is_none());
        assert!(Coordinates::from_query(None, Some("72.87")).is_none());
        assert!(Coordinates::from_query(Some("north"), Some("72.87")).is_none());
        assert!(Coordinates::from_query(Some("NaN"), Some("72.87")).is_none());
        assert!(Coordinates::from_query(Some("inf"), Some("72.87")).is_none());
    }

    #[test]
    fn test_with_fallback_fills_each_component() {
        let fallback = Coordinates {
            latitude: 19.076,
            longitude: 72.8777,
        };
        let coords = Coordinates::with_fallback(Some(51.5), None, fallback);
        assert_eq!(coords.latitude, 51.5);
        assert_eq!(coords.longitude, 72.8777);
        assert_eq!(Coordinates::with_fallback(None, None, fallback), fallback);
    }

    #[test]
    fn test_parse_or_zero() {
        assert_eq!(parse_or_zero(Some("48.85")), 48.85);
        assert_eq!(parse_or_zero(Some("")), 0.0);
        assert_eq!(parse_or_zero(None), 0.0);
    }

    #[test]
    fn test_unresolved_record_serialization() {
        let value = serde_json::to_value(LocationRecord::unresolved()).unwrap();
        assert_eq!(
            value,
            json!({
                "city": "",
                "country": "",
                "latitude": null,
                "longitude": null,
                "timezone": null
            })
        );
    }

    #[test]
    fn test_resolved_record_serialization() {
        let record = LocationRecord::resolved(
            "Mumbai".into(),
            "Maharashtra".into(),
            "India".into(),
            (19.076, 72.8777),
            "Asia/Kolkata".into(),
        );
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["region"], "Maharashtra");
        assert_eq!(value["timezone"], "Asia/Kolkata");
        assert!(record.is_usable());
    }

    #[test]
    fn test_usable_requires_city_or_country() {
        let mut record = LocationRecord::unresolved();
        assert!(!record.is_usable());
        record.country = "DE".into();
        assert!(record.is_usable());
    }
}
