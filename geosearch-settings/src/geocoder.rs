//! Settings for the geocoders that place searches are sent to.

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationMilliSeconds};
use std::time::Duration;

/// A geocoder, or a combinator wrapping another geocoder.
///
/// Geocoders form a tree: combinators such as [`TimeoutConfig`] hold the
/// configuration of the geocoder they wrap in `inner`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeocoderConfig {
    /// Query a Nominatim-compatible HTTP search API.
    Nominatim(NominatimConfig),
    /// Bound the time spent by the inner geocoder.
    Timeout(TimeoutConfig),
    /// Return the same places for every query. Debug only.
    Fixed(FixedConfig),
}

/// Settings for the Nominatim geocoder.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    /// The search endpoint, such as `https://nominatim.openstreetmap.org/search`.
    pub endpoint: String,

    /// Sent as the `User-Agent` header. Nominatim's usage policy requires an
    /// application to identify itself.
    pub user_agent: String,

    /// Sent as the `limit` query parameter, and the most places kept from a
    /// response.
    pub max_results: usize,

    /// How long to wait for the TCP connection to the endpoint.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "connect_timeout_ms")]
    pub connect_timeout: Duration,

    /// How long a whole request, including reading the body, may take.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "request_timeout_ms")]
    pub request_timeout: Duration,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            user_agent: "Geosearch-Educational-App".to_string(),
            max_results: 5,
            connect_timeout: Duration::from_secs(2),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// Settings for the timeout combinator.
#[serde_as]
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// The time to wait before failing with a timeout.
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "max_time_ms")]
    pub max_time: Duration,

    /// The geocoder being bounded.
    pub inner: Box<GeocoderConfig>,
}

impl TimeoutConfig {
    /// Bound `inner` with the default time limit.
    #[must_use]
    pub fn with_inner(inner: GeocoderConfig) -> Self {
        Self {
            inner: Box::new(inner),
            ..Self::default()
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            max_time: Duration::from_secs(5),
            inner: Box::new(GeocoderConfig::Nominatim(NominatimConfig::default())),
        }
    }
}

/// Settings for the fixed geocoder.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FixedConfig {
    /// The places returned for every query. An empty list means every query
    /// has no matches.
    pub places: Vec<FixedPlace>,
}

/// One place returned by the fixed geocoder.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FixedPlace {
    /// Latitude, as a decimal string.
    pub latitude: String,
    /// Longitude, as a decimal string.
    pub longitude: String,
    /// The human readable name of the place.
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::{GeocoderConfig, TimeoutConfig};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_nested_config_from_json() {
        let config: GeocoderConfig = serde_json::from_value(json!({
            "type": "timeout",
            "max_time_ms": 250,
            "inner": {
                "type": "nominatim",
                "endpoint": "http://localhost:1234/search",
                "max_results": 3,
            }
        }))
        .expect("config should deserialize");

        let GeocoderConfig::Timeout(timeout) = config else {
            panic!("expected timeout config");
        };
        assert_eq!(timeout.max_time, Duration::from_millis(250));
        let GeocoderConfig::Nominatim(nominatim) = *timeout.inner else {
            panic!("expected nominatim config");
        };
        assert_eq!(nominatim.endpoint, "http://localhost:1234/search");
        assert_eq!(nominatim.max_results, 3);
        // Unspecified fields fall back to their defaults.
        assert_eq!(nominatim.user_agent, "Geosearch-Educational-App");
    }

    #[test]
    fn test_fixed_config_defaults_to_no_places() {
        let config: GeocoderConfig =
            serde_json::from_value(json!({ "type": "fixed" })).expect("config should deserialize");
        assert!(matches!(config, GeocoderConfig::Fixed(fixed) if fixed.places.is_empty()));
    }

    #[test]
    fn test_timeout_serializes_as_milliseconds() {
        let value = serde_json::to_value(TimeoutConfig::default()).expect("failed to serialize");
        assert_eq!(value["max_time_ms"], json!(5000));
        assert_eq!(value["inner"]["type"], json!("nominatim"));
    }
}
