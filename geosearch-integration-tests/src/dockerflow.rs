//! Tests for the health and release endpoints that deploy tooling probes.
#![cfg(test)]

use crate::{geosearch_test, TestingTools};
use anyhow::Result;
use geosearch_settings::{geocoder::FixedConfig, GeocoderConfig};
use pretty_assertions::assert_eq;
use reqwest::StatusCode;

#[actix_rt::test]
async fn health_endpoints_never_reach_the_geocoder() -> Result<()> {
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

            for path in ["/__lbheartbeat__", "/__heartbeat__", "/__version__"] {
                let response = test_client.get(path).send().await?;
                assert_eq!(response.status(), StatusCode::OK, "{}", path);
            }

            assert_eq!(upstream.hits_async().await, 0);
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn heartbeat_reports_the_configured_geocoder() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body: serde_json::Value = test_client
                .get("/__heartbeat__")
                .send()
                .await?
                .json()
                .await?;

            assert_eq!(body["geocoder"], "timeout(NominatimGeocoder)");
            assert!(body["version"].is_string());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn heartbeat_follows_settings() -> Result<()> {
    geosearch_test(
        |settings| {
            settings.debug = true;
            settings.geocoder = GeocoderConfig::Fixed(FixedConfig::default());
        },
        |TestingTools { test_client, .. }| async move {
            let body: serde_json::Value = test_client
                .get("/__heartbeat__")
                .send()
                .await?
                .json()
                .await?;

            assert_eq!(body["geocoder"], "FixedGeocoder(0 places)");
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn lbheartbeat_has_no_body() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let body = test_client.get("/__lbheartbeat__").send().await?.text().await?;
            assert!(body.is_empty());
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn version_describes_the_release() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools { test_client, .. }| async move {
            let response = test_client.get("/__version__").send().await?;
            assert_eq!(
                response
                    .headers()
                    .get("content-type")
                    .and_then(|v| v.to_str().ok()),
                Some("application/json")
            );

            let version: serde_json::Value = response.json().await?;
            for key in ["source", "version", "commit", "build"] {
                assert!(version[key].is_string(), "missing {}", key);
            }
            Ok(())
        },
    )
    .await
}
