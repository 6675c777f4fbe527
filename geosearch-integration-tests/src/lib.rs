#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
// This is a compromise.
#![allow(dead_code)]

//! Tests for Geosearch that work by talking to a running server over HTTP.
//!
//! The paths and the form field name used in tests here are the public
//! interface of the search page, and are kept stable.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file like would happen if this were
//! `geosearch/tests/...`. This improves compilation and test times.
//!
//! The primary tool used by tests is [`geosearch_test`], which starts a mock
//! geocoding service, sets up the application for testing, and provides
//! helpers to inspect the state of the app. It then calls the test function
//! that is passed to it, providing the above tools as an argument.
//!
//! ```no_run
//! use geosearch_integration_tests::{geosearch_test, TestingTools};
//!
//! #[actix_rt::test]
//! async fn lbheartbeat_works() {
//!     geosearch_test(
//!         |_settings| (),
//!         |TestingTools { test_client, .. }| async move {
//!             let response = test_client
//!                 .get("/__lbheartbeat__")
//!                 .send()
//!                 .await
//!                 .expect("failed to execute request");
//!             assert!(response.status().is_success());
//!         },
//!     )
//!     .await
//! }
//! ```

mod dockerflow;
mod logging;
mod search;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    test_tools::{geosearch_test, TestReqwestClient, TestingTools},
};
