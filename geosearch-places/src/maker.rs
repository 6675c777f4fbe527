//! Tools to build geocoders from configuration.

use geosearch_settings::{GeocoderConfig, Settings};

use crate::{FixedGeocoder, Geocoder, NominatimGeocoder, SetupError, TimeoutGeocoder};

/// Recursive helper to build a tree of geocoders.
///
/// # Errors
/// If any geocoder in the tree can't be set up.
pub fn make_geocoder(
    settings: &Settings,
    config: &GeocoderConfig,
) -> Result<Box<dyn Geocoder>, SetupError> {
    let geocoder: Box<dyn Geocoder> = match config {
        GeocoderConfig::Nominatim(nominatim_config) => {
            NominatimGeocoder::new_boxed(nominatim_config)?
        }

        GeocoderConfig::Timeout(timeout_config) => {
            let inner = make_geocoder(settings, timeout_config.inner.as_ref())?;
            TimeoutGeocoder::new_boxed(timeout_config, inner)
        }

        GeocoderConfig::Fixed(fixed_config) => FixedGeocoder::new_boxed(settings, fixed_config)?,
    };

    tracing::debug!(r#type = "places.maker", geocoder = %geocoder.name(), "Built geocoder");
    Ok(geocoder)
}

#[cfg(test)]
mod tests {
    use super::make_geocoder;
    use geosearch_settings::{geocoder::TimeoutConfig, GeocoderConfig, Settings};

    #[test]
    fn test_default_tree() {
        let settings = Settings::load_for_tests(|_| ());
        let geocoder =
            make_geocoder(&settings, &settings.geocoder).expect("default tree should build");
        assert_eq!(geocoder.name(), "timeout(NominatimGeocoder)");
    }

    #[test]
    fn test_fixed_inside_timeout() {
        let settings = Settings::load_for_tests(|s| s.debug = true);
        let config = GeocoderConfig::Timeout(TimeoutConfig::with_inner(GeocoderConfig::Fixed(
            Default::default(),
        )));
        let geocoder = make_geocoder(&settings, &config).expect("tree should build");
        assert_eq!(geocoder.name(), "timeout(FixedGeocoder(0 places))");
    }

    #[test]
    fn test_errors_propagate_from_inner() {
        let settings = Settings::load_for_tests(|s| s.debug = false);
        let config = GeocoderConfig::Timeout(TimeoutConfig::with_inner(GeocoderConfig::Fixed(
            Default::default(),
        )));
        assert!(make_geocoder(&settings, &config).is_err());
    }
}
