#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Place search backends for [Geosearch](../geosearch/index.html).
//!
//! A [`Geocoder`] turns a free text [`Query`] into a [`SearchResult`]: an
//! ordered list of [`PlaceRecord`]s, or a marker saying nothing matched.
//! Geocoders are composed into a tree from settings with [`make_geocoder`].

mod geocoders;
mod maker;

use async_trait::async_trait;
use fake::Dummy;
use thiserror::Error;

pub use crate::geocoders::{FixedGeocoder, NominatimGeocoder, TimeoutGeocoder};
pub use crate::maker::make_geocoder;

/// One place found for a query.
#[derive(Debug, Clone, PartialEq, Eq, Dummy)]
pub struct PlaceRecord {
    /// Latitude as a decimal string, exactly as the geocoder provided it.
    pub latitude: String,
    /// Longitude as a decimal string, exactly as the geocoder provided it.
    pub longitude: String,
    /// A human readable name for the place.
    pub label: String,
}

/// The outcome of a place search, from the point of view of someone looking
/// at the search page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchResult {
    /// No search has been made yet. Geocoders never return this; it is the
    /// state of a form that has not been submitted.
    NotSubmitted,

    /// The search was made, and nothing matched.
    NoMatches,

    /// The places found, in the order the geocoder ranked them. Never empty.
    Places(Vec<PlaceRecord>),
}

impl SearchResult {
    /// Wrap `places`, using [`SearchResult::NoMatches`] if there are none.
    #[must_use]
    pub fn from_places(places: Vec<PlaceRecord>) -> Self {
        if places.is_empty() {
            Self::NoMatches
        } else {
            Self::Places(places)
        }
    }

    /// The places found, if any.
    #[must_use]
    pub fn places(&self) -> &[PlaceRecord] {
        match self {
            Self::Places(places) => places,
            Self::NotSubmitted | Self::NoMatches => &[],
        }
    }
}

/// Place search text that has been checked to contain something to search for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    /// Check `text` and trim surrounding whitespace.
    ///
    /// # Errors
    /// [`SearchError::EmptyQuery`] if `text` is empty or only whitespace.
    pub fn parse(text: &str) -> Result<Self, SearchError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            Err(SearchError::EmptyQuery)
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// The query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A backend that can find places for a query.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// An operator-visible name for the geocoder, used in logs.
    fn name(&self) -> String;

    /// Find places matching `query`.
    async fn search(&self, query: &Query) -> Result<SearchResult, SearchError>;
}

/// Search for the free text `text` with `geocoder`.
///
/// Empty or whitespace only text is rejected without calling the geocoder.
///
/// # Errors
/// See [`SearchError`].
pub async fn search(geocoder: &dyn Geocoder, text: &str) -> Result<SearchResult, SearchError> {
    let query = Query::parse(text)?;
    geocoder.search(&query).await
}

/// Errors that may occur while setting up a geocoder.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The geocoder cannot be used with the current configuration.
    #[error("This geocoder cannot be used with the current Geosearch configuration")]
    InvalidConfiguration(#[source] anyhow::Error),

    /// Something went wrong preparing network access for the geocoder.
    #[error("There was a network error while setting up this geocoder")]
    Network(#[source] anyhow::Error),
}

/// Errors that may occur while searching for places.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The geocoding service did not answer in time. No partial result is kept.
    #[error("The geocoding service did not respond in time")]
    NetworkTimeout,

    /// The geocoding service could not be reached, replied with an error
    /// status, or replied with something that isn't a list of places.
    #[error("The geocoding service failed: {0}")]
    Upstream(#[source] anyhow::Error),

    /// There was nothing to search for.
    #[error("The query is empty")]
    EmptyQuery,
}

#[cfg(test)]
mod tests {
    use super::{search, Geocoder, PlaceRecord, Query, SearchError, SearchResult};
    use async_trait::async_trait;
    use fake::{Fake, Faker};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls, and echoes the query back as the label of one place.
    #[derive(Default)]
    struct EchoGeocoder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Geocoder for EchoGeocoder {
        fn name(&self) -> String {
            "EchoGeocoder".to_string()
        }

        async fn search(&self, query: &Query) -> Result<SearchResult, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SearchResult::from_places(vec![PlaceRecord {
                label: query.as_str().to_string(),
                ..Faker.fake()
            }]))
        }
    }

    #[test]
    fn test_query_parse_trims() {
        let query = Query::parse("  Paris \n").expect("query should parse");
        assert_eq!(query.as_str(), "Paris");
    }

    #[test]
    fn test_query_parse_rejects_blank() {
        assert!(matches!(Query::parse(""), Err(SearchError::EmptyQuery)));
        assert!(matches!(Query::parse(" \t\n "), Err(SearchError::EmptyQuery)));
    }

    #[test]
    fn test_from_places() {
        assert_eq!(SearchResult::from_places(vec![]), SearchResult::NoMatches);
        let place: PlaceRecord = Faker.fake();
        assert_eq!(
            SearchResult::from_places(vec![place.clone()]),
            SearchResult::Places(vec![place])
        );
    }

    #[test]
    fn test_places_of_markers_are_empty() {
        assert!(SearchResult::NotSubmitted.places().is_empty());
        assert!(SearchResult::NoMatches.places().is_empty());
    }

    #[tokio::test]
    async fn test_search_skips_geocoder_for_blank_text() {
        let geocoder = EchoGeocoder::default();
        let result = search(&geocoder, "   ").await;
        assert!(matches!(result, Err(SearchError::EmptyQuery)));
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_passes_trimmed_query() {
        let geocoder = EchoGeocoder::default();
        let result = search(&geocoder, " Lima ").await.expect("search should work");
        assert_eq!(result.places()[0].label, "Lima");
        assert_eq!(geocoder.calls.load(Ordering::SeqCst), 1);
    }
}
