//! A geocoder that provides the same places for every query.
//!
//! It is meant to be used in development and testing, when the real geocoding
//! service shouldn't be contacted.

use anyhow::anyhow;
use async_trait::async_trait;
use geosearch_settings::{geocoder::FixedConfig, Settings};

use crate::{Geocoder, PlaceRecord, Query, SearchError, SearchResult, SetupError};

/// A geocoder that always provides the same places.
pub struct FixedGeocoder {
    /// The places returned for every query.
    places: Vec<PlaceRecord>,
}

impl FixedGeocoder {
    /// Create a FixedGeocoder from settings.
    ///
    /// # Errors
    /// If `settings.debug` is false.
    pub fn new_boxed(settings: &Settings, config: &FixedConfig) -> Result<Box<Self>, SetupError> {
        if !settings.debug {
            return Err(SetupError::InvalidConfiguration(anyhow!(
                "FixedGeocoder can only be used in debug mode",
            )));
        }

        let places = config
            .places
            .iter()
            .map(|place| PlaceRecord {
                latitude: place.latitude.clone(),
                longitude: place.longitude.clone(),
                label: place.label.clone(),
            })
            .collect();
        Ok(Box::new(Self { places }))
    }
}

#[async_trait]
impl Geocoder for FixedGeocoder {
    fn name(&self) -> String {
        format!("FixedGeocoder({} places)", self.places.len())
    }

    async fn search(&self, _query: &Query) -> Result<SearchResult, SearchError> {
        Ok(SearchResult::from_places(self.places.clone()))
    }
}
