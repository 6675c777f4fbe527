//! Tools to make sure geocoders don't take excessive amounts of time.

use async_trait::async_trait;
use geosearch_settings::geocoder::TimeoutConfig;
use std::time::Duration;

use crate::{Geocoder, Query, SearchError, SearchResult};

/// A combinator geocoder that fails with [`SearchError::NetworkTimeout`] if
/// the wrapped geocoder takes too long.
pub struct TimeoutGeocoder {
    /// The time to wait before giving up.
    max_time: Duration,

    /// The geocoder to pull places from.
    inner: Box<dyn Geocoder>,
}

impl TimeoutGeocoder {
    /// Construct a new, boxed timeout geocoder.
    #[must_use]
    pub fn new_boxed(config: &TimeoutConfig, inner: Box<dyn Geocoder>) -> Box<Self> {
        Box::new(Self {
            max_time: config.max_time,
            inner,
        })
    }
}

#[async_trait]
impl Geocoder for TimeoutGeocoder {
    fn name(&self) -> String {
        format!("timeout({})", self.inner.name())
    }

    async fn search(&self, query: &Query) -> Result<SearchResult, SearchError> {
        let inner_fut = self.inner.search(query);
        tokio::time::timeout(self.max_time, inner_fut)
            .await
            .unwrap_or_else(|_timeout_elapsed| {
                tracing::warn!(
                    r#type = "places.timeout",
                    geocoder = %self.inner.name(),
                    max_time_ms = self.max_time.as_millis() as u64,
                    "Geocoder took too long"
                );
                Err(SearchError::NetworkTimeout)
            })
    }
}
