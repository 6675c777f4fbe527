//! Web handlers for the place search form.

use actix_web::{
    get, post,
    web::{Data, Form, FormConfig, ServiceConfig},
    HttpResponse,
};
use geosearch_places::{search, Geocoder, SearchResult};
use serde::Deserialize;

use crate::{
    errors::HandlerErrorKind,
    page::{Failure, SearchPage},
};

/// The geocoder tree, shared by every worker.
pub type GeocoderRef = Box<dyn Geocoder>;

/// Configure the routes for the search form.
pub fn configure(config: &mut ServiceConfig) {
    config
        .app_data(FormConfig::default().error_handler(|error, _request| {
            HandlerErrorKind::MalformedForm(error.to_string()).into()
        }))
        .service(show_form)
        .service(submit_form);
}

/// The fields of the submitted search form.
#[derive(Debug, Deserialize)]
struct SearchForm {
    /// The place name typed by the user.
    lugar: String,
}

/// Show the search form, with no results.
#[get("/")]
async fn show_form() -> HttpResponse {
    SearchPage::empty().respond()
}

/// Search for the place named in the form, and show what was found.
#[post("/")]
#[tracing::instrument(skip(form, geocoder))]
async fn submit_form(form: Form<SearchForm>, geocoder: Data<GeocoderRef>) -> HttpResponse {
    let query = form.lugar.as_str();
    tracing::info!(
        r#type = "web.search.request",
        %query,
        geocoder = %geocoder.name(),
        "handling search request"
    );

    match search(&***geocoder, query).await {
        Ok(results) => {
            tracing::debug!(
                r#type = "web.search.provided-count",
                place_count = results.places().len(),
                "Providing places"
            );
            SearchPage {
                query,
                results,
                failure: None,
            }
            .respond()
        }
        Err(error) => {
            tracing::warn!(%error, r#type = "web.search.error", %query, "Error searching for places");
            SearchPage {
                query,
                results: SearchResult::NoMatches,
                failure: Some(Failure::from(&error)),
            }
            .respond()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{configure, GeocoderRef};
    use actix_web::{
        http::StatusCode,
        test::{self, TestRequest},
        web::Data,
        App,
    };
    use async_trait::async_trait;
    use geosearch_places::{Geocoder, PlaceRecord, Query, SearchError, SearchResult};

    /// Answers based on the query text, so one app can exercise every outcome.
    struct ScriptedGeocoder;

    #[async_trait]
    impl Geocoder for ScriptedGeocoder {
        fn name(&self) -> String {
            "ScriptedGeocoder".to_string()
        }

        async fn search(&self, query: &Query) -> Result<SearchResult, SearchError> {
            match query.as_str() {
                "Paris" => Ok(SearchResult::Places(vec![PlaceRecord {
                    latitude: "48.8566".into(),
                    longitude: "2.3522".into(),
                    label: "Paris, France".into(),
                }])),
                "slow" => Err(SearchError::NetworkTimeout),
                "broken" => Err(SearchError::Upstream(anyhow::anyhow!("bad gateway"))),
                _ => Ok(SearchResult::NoMatches),
            }
        }
    }

    async fn post_lugar(lugar: &str) -> (StatusCode, String) {
        let geocoder: GeocoderRef = Box::new(ScriptedGeocoder);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(geocoder))
                .configure(configure),
        )
        .await;
        let request = TestRequest::post()
            .uri("/")
            .set_form([("lugar", lugar)])
            .to_request();
        let response = test::call_service(&app, request).await;
        let status = response.status();
        let body = test::read_body(response).await;
        (status, String::from_utf8(body.to_vec()).expect("page should be utf8"))
    }

    #[actix_rt::test]
    async fn test_get_shows_empty_form() {
        let app = test::init_service(App::new().configure(configure)).await;
        let response = test::call_service(&app, TestRequest::get().uri("/").to_request()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = test::read_body(response).await;
        let html = String::from_utf8(body.to_vec()).expect("page should be utf8");
        assert!(html.contains("<form method=\"post\""));
        assert!(!html.contains("class=\"places\""));
    }

    #[actix_rt::test]
    async fn test_post_shows_places() {
        let (status, html) = post_lugar("Paris").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("Paris, France"));
        assert!(html.contains("48.8566, 2.3522"));
    }

    #[actix_rt::test]
    async fn test_post_without_matches() {
        let (status, html) = post_lugar("zzzznotaplace").await;
        assert_eq!(status, StatusCode::OK);
        assert!(html.contains("No places found"));
    }

    #[actix_rt::test]
    async fn test_post_failures_are_distinct() {
        let (status, html) = post_lugar("slow").await;
        assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
        assert!(html.contains("took too long"));

        let (status, html) = post_lugar("broken").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(html.contains("unavailable"));

        let (status, html) = post_lugar("   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(html.contains("Type the name of a place"));
    }

    #[actix_rt::test]
    async fn test_post_without_field_is_malformed() {
        let geocoder: GeocoderRef = Box::new(ScriptedGeocoder);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(geocoder))
                .configure(configure),
        )
        .await;
        let request = TestRequest::post()
            .uri("/")
            .set_form([("place", "Paris")])
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
