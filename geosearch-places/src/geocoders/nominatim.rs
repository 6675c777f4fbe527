//! A geocoder that queries a Nominatim search API, such as the public one at
//! <https://nominatim.openstreetmap.org>.

use anyhow::{anyhow, Context};
use async_trait::async_trait;
use geosearch_settings::geocoder::NominatimConfig;
use serde::Deserialize;

use crate::{Geocoder, PlaceRecord, Query, SearchError, SearchResult, SetupError};

/// A geocoder that sends each query to a Nominatim endpoint.
pub struct NominatimGeocoder {
    /// The HTTP client used for every request.
    client: reqwest::Client,
    /// Where to send requests, and how many places to ask for.
    config: NominatimConfig,
}

/// The fields used from one element of Nominatim's JSON response. Other
/// fields are ignored.
#[derive(Debug, Deserialize)]
struct NominatimPlace {
    /// Latitude, as a decimal string.
    lat: String,
    /// Longitude, as a decimal string.
    lon: String,
    /// The full name of the place, including the regions containing it.
    display_name: String,
}

impl From<NominatimPlace> for PlaceRecord {
    fn from(place: NominatimPlace) -> Self {
        Self {
            latitude: place.lat,
            longitude: place.lon,
            label: place.display_name,
        }
    }
}

impl NominatimGeocoder {
    /// Create a NominatimGeocoder from settings.
    ///
    /// # Errors
    /// If the endpoint is not a valid URL, or the HTTP client can't be built.
    pub fn new_boxed(config: &NominatimConfig) -> Result<Box<Self>, SetupError> {
        reqwest::Url::parse(&config.endpoint)
            .with_context(|| format!("Invalid Nominatim endpoint {:?}", config.endpoint))
            .map_err(SetupError::InvalidConfiguration)?;

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .build()
            .context("Unable to create the Reqwest client")
            .map_err(SetupError::Network)?;

        Ok(Box::new(Self {
            client,
            config: config.clone(),
        }))
    }
}

/// Sort a reqwest failure into a timeout or an upstream error.
fn classify(error: reqwest::Error, context: &'static str) -> SearchError {
    if error.is_timeout() {
        SearchError::NetworkTimeout
    } else {
        SearchError::Upstream(anyhow::Error::new(error).context(context))
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> String {
        "NominatimGeocoder".to_owned()
    }

    async fn search(&self, query: &Query) -> Result<SearchResult, SearchError> {
        let limit = self.config.max_results.to_string();
        tracing::debug!(
            r#type = "places.nominatim.request",
            endpoint = %self.config.endpoint,
            query = query.as_str(),
            "Sending query to Nominatim"
        );

        let response = self
            .client
            .get(&self.config.endpoint)
            .query(&[
                ("q", query.as_str()),
                ("format", "json"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| classify(e, "Couldn't reach the geocoding service"))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Upstream(anyhow!(
                "Geocoding service replied with status {}",
                status
            )));
        }

        let places: Vec<NominatimPlace> = response.json().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::NetworkTimeout
            } else {
                SearchError::Upstream(anyhow!("Failed to parse the JSON response: {}", e))
            }
        })?;

        tracing::debug!(
            r#type = "places.nominatim.response",
            place_count = places.len(),
            "Nominatim replied"
        );

        let records = places
            .into_iter()
            .take(self.config.max_results)
            .map(PlaceRecord::from)
            .collect();
        Ok(SearchResult::from_places(records))
    }
}
