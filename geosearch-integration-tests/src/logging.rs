//! Tests that Geosearch logs what it does.
#![cfg(test)]

use crate::{geosearch_test, TestingTools};
use anyhow::Result;
use httpmock::Method::GET;
use serde_json::json;
use tracing::Level;

#[actix_rt::test]
async fn search_requests_are_logged() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             log_watcher,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path("/search");
                    then.status(200).json_body(json!([]));
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "Llanfairpwllgwyngyll")])
                .send()
                .await?;
            assert!(response.status().is_success());

            assert!(log_watcher.has(|event| {
                event.level == Level::INFO
                    && event.field_contains("type", "web.search.request")
                    && event.field_contains("query", "Llanfairpwllgwyngyll")
            }));
            assert!(log_watcher.has(|event| event.field_contains("message", "Request success")));
            Ok(())
        },
    )
    .await
}

#[actix_rt::test]
async fn search_failures_are_logged() -> Result<()> {
    geosearch_test(
        |_| (),
        |TestingTools {
             test_client,
             upstream_mock,
             log_watcher,
             ..
         }| async move {
            upstream_mock
                .mock_async(|when, then| {
                    when.method(GET).path("/search");
                    then.status(503);
                })
                .await;

            let response = test_client
                .post_form("/", &[("lugar", "Taumatawhakatangihanga")])
                .send()
                .await?;
            assert!(response.status().is_server_error());

            assert!(log_watcher.has(|event| {
                event.level == Level::WARN
                    && event.field_contains("type", "web.search.error")
                    && event.field_contains("query", "Taumatawhakatangihanga")
            }));
            assert!(log_watcher.has(|event| {
                event.level == Level::ERROR && event.field_contains("message", "Request server error")
            }));
            Ok(())
        },
    )
    .await
}
