//! Tests for the place search form, with the geocoding service mocked.
#![cfg(test)]

use crate::{
    geosearch_test,
    utils::test_tools::{TEST_GEOCODER_TIMEOUT, TEST_USER_AGENT},
    TestingTools,
};
use anyhow::Result;
use geosearch_settings::{
    geocoder::{FixedConfig, FixedPlace},
    GeocoderConfig,
};
use httpmock::Method::GET;
use pretty_assertions::assert_eq;
use reqwest::StatusCode;
use serde_json::json;

#[actix_rt::test]
async fn get_shows_the_empty_form() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let upstream = upstream_mock
                .mock_async(|when, then| {
                    when.any_request();
                    then.status(500);
                })
                .await;

            let response = test_client.get("/").send().await?;

            assert_eq!(response.status(), StatusCode::OK);
            let html = response.text().await?;
            assert!(html.contains("name=\"lugar\""));
            assert!(!html.contains("class=\"places\""));
            assert!(!html.contains("No places found"));
            assert_eq!(upstream.hits_async().await, 0);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_forwards_query_and_shows_places() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let upstream = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/search")
                        .query_param("q", "Paris")
                        .query_param("format", "json")
                        .query_param("limit", "5")
                        .header("user-agent", TEST_USER_AGENT);
                    then.status(200).json_body(json!([
                        {"lat": "48.8566", "lon": "2.3522", "display_name": "Paris, France"}
                    ]));
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "Paris")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let html = response.text().await?;
            assert!(html.contains("Paris, France"));
            assert!(html.contains("48.8566, 2.3522"));
            assert!(html.contains("value=\"Paris\""));
            upstream.assert_async().await;
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_keeps_upstream_order_and_cap() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let places: Vec<_> = ["Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot"]
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    json!({"lat": format!("{}.5", i), "lon": "10.0", "display_name": name})
                })
                .collect();
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path("/search");
                    then.status(200)
                        .json_body(serde_json::Value::Array(places.clone()));
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "phonetic")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let html = response.text().await?;
            let positions: Vec<usize> = ["Alpha", "Bravo", "Charlie", "Delta", "Echo"]
                .iter()
                .map(|name| html.find(name).expect("place should be on the page"))
                .collect();
            assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
            assert!(!html.contains("Foxtrot"));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_with_no_matches() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/search")
                        .query_param("q", "zzzznotaplace");
                    then.status(200).json_body(json!([]));
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "zzzznotaplace")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            let html = response.text().await?;
            assert!(html.contains("No places found"));
            assert!(!html.contains("class=\"error\""));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_when_upstream_fails() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path("/search");
                    then.status(500).body("Internal Server Error");
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "Paris")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
            let html = response.text().await?;
            assert!(html.contains("unavailable"));
            assert!(!html.contains("No places found"));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_when_upstream_sends_garbage() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path("/search");
                    then.status(200)
                        .header("content-type", "text/html")
                        .body("<html>Rate limited</html>");
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "Paris")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_when_upstream_is_slow() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path("/search");
                    then.status(200)
                        .json_body(json!([
                            {"lat": "1.0", "lon": "1.0", "display_name": "Too late"}
                        ]))
                        .delay(TEST_GEOCODER_TIMEOUT * 4);
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "Paris")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
            let html = response.text().await?;
            assert!(html.contains("took too long"));
            assert!(!html.contains("Too late"));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_blank_query_is_not_forwarded() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let upstream = upstream_mock
                .mock_async(|when, then| {
                    when.any_request();
                    then.status(200).json_body(json!([]));
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "   ")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let html = response.text().await?;
            assert!(html.contains("Type the name of a place"));
            assert_eq!(upstream.hits_async().await, 0);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn post_without_the_form_field() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post_form("/", &[("place", "Paris")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            let body: serde_json::Value = response.json().await?;
            assert!(body["error"]
                .as_str()
                .map_or(false, |e| e.starts_with("Malformed form")));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn repeated_queries_give_the_same_page() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             ..
         }| async move {
            let upstream = upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path("/search").query_param("q", "Lima");
                    then.status(200).json_body(json!([
                        {"lat": "-12.0464", "lon": "-77.0428", "display_name": "Lima, Perú"}
                    ]));
                })
                .await;

            let first = test_client
                .post_form("/", &[("lugar", "Lima")])
                .send()
                .await?
                .text()
                .await?;
            let second = test_client
                .post_form("/", &[("lugar", "Lima")])
                .send()
                .await?
                .text()
                .await?;

            assert_eq!(first, second);
            assert_eq!(upstream.hits_async().await, 2);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn fixed_geocoder_in_debug_mode() -> Result<()> {
    geosearch_test(
        |settings| {
            settings.debug = true;
            settings.geocoder = GeocoderConfig::Fixed(FixedConfig {
                places: vec![FixedPlace {
                    latitude: "0.0".to_string(),
                    longitude: "0.0".to_string(),
                    label: "Null Island".to_string(),
                }],
            });
        },
        |TestingTools { test_client, .. }| async move {
            let response = test_client
                .post_form("/", &[("lugar", "anywhere")])
                .send()
                .await?;

            assert_eq!(response.status(), StatusCode::OK);
            assert!(response.text().await?.contains("Null Island"));
            Ok(())
        },
    )
    .await
}
