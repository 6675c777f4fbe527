//! Tools for running tests

use crate::utils::logging::LogWatcher;
use geosearch_settings::{
    geocoder::{NominatimConfig, TimeoutConfig},
    GeocoderConfig, Settings,
};
use httpmock::MockServer;
use reqwest::{redirect, Client, ClientBuilder, RequestBuilder};
use serde::Serialize;
use std::{future::Future, net::TcpListener, sync::OnceLock, time::Duration};
use tracing_subscriber::layer::SubscriberExt;

/// The User-Agent the server under test identifies itself with upstream.
pub const TEST_USER_AGENT: &str = "geosearch-integration-tests";

/// How long the server under test waits for the mock geocoding service.
pub const TEST_GEOCODER_TIMEOUT: Duration = Duration::from_millis(500);

/// Run a test with a fully configured Geosearch server.
///
/// The server will listen on a port assigned arbitrarily by the OS.
///
/// A suite of tools will be passed to the test function in the form of an
/// instance of [`TestingTools`]. It includes an HTTP client configured to use
/// the test server, an HTTP mock server that the geocoder has been configured
/// to query, and a log collector that can make assertions about logs that
/// were printed.
///
/// # Example
///
/// ```no_run
/// # use geosearch_integration_tests::{geosearch_test, TestingTools};
/// #[actix_rt::test]
/// async fn a_test() {
///     geosearch_test(
///         |settings| settings.debug = false,
///         |TestingTools { test_client, log_watcher, .. }| async move {
///             assert!(true) // Test goes here
///         }
///     ).await
/// }
/// ```
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn geosearch_test<FSettings, FTest, Fut>(
    settings_changer: FSettings,
    test: FTest,
) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: FnOnce(TestingTools) -> Fut,
    Fut: Future,
{
    let log_watcher = init_test_logging();

    // Set up a mock server for the geocoder to talk to
    let upstream_mock = MockServer::start_async().await;

    let settings = Settings::load_for_tests(|settings| {
        settings.geocoder = GeocoderConfig::Timeout(TimeoutConfig {
            max_time: TEST_GEOCODER_TIMEOUT,
            inner: Box::new(GeocoderConfig::Nominatim(NominatimConfig {
                endpoint: upstream_mock.url("/search"),
                user_agent: TEST_USER_AGENT.to_string(),
                ..NominatimConfig::default()
            })),
        });
        settings_changer(settings);
    });

    // Run server in the background
    let listener = TcpListener::bind(settings.http.listen).expect("Failed to bind to a port");
    let address = listener
        .local_addr()
        .expect("Listener has no address")
        .to_string();
    let server = geosearch_web::run(listener, settings).expect("Failed to start server");
    let server_handle = server.handle();
    actix_rt::spawn(server);
    let test_client = TestReqwestClient::new(address);

    // Assemble the tools
    let tools = TestingTools {
        test_client,
        upstream_mock,
        log_watcher,
    };

    // Run the test
    let rv = test(tools).await;
    server_handle.stop(false).await;
    rv
}

/// Install the process-wide log collector, once, and return a handle to it.
fn init_test_logging() -> LogWatcher {
    static LOG_WATCHER: OnceLock<LogWatcher> = OnceLock::new();

    LOG_WATCHER
        .get_or_init(|| {
            let log_watcher = LogWatcher::default();
            let log_watcher_writer = log_watcher.make_writer();

            let settings = Settings::load_for_tests(|_| ());
            let env_filter: tracing_subscriber::EnvFilter = (&settings.logging.levels).into();
            let subscriber = tracing_subscriber::registry().with(env_filter).with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(move || log_watcher_writer.clone()),
            );
            tracing::subscriber::set_global_default(subscriber)
                .expect("Could not install the test log collector");

            log_watcher
        })
        .clone()
}

/// A set of tools for tests, including mock servers and logging helpers.
///
/// The fields of this struct are marked as non-exhaustive, meaning that any
/// destructuring of this struct will require a `..` "and the rest" entry, even
/// if all present items are named. This makes adding tools in the future easier,
/// since old tests won't need to be rewritten to account for the added tools.
#[non_exhaustive]
pub struct TestingTools {
    /// A wrapper around a `reqwest::client` that automatically uses the
    /// Geosearch server under test.
    pub test_client: TestReqwestClient,

    /// A [`httpmock::MockServer`] that the geocoder has been configured to
    /// send searches to, at the path `/search`. Does not contain mock
    /// responses, any needed must be added.
    pub upstream_mock: MockServer,

    /// To make assertions about logs.
    pub log_watcher: LogWatcher,
}

/// A wrapper around a `[reqwest::client]` that automatically sends requests to
/// the test server.
///
/// The client is configured to not follow any redirects.
pub struct TestReqwestClient {
    /// The wrapped client.
    client: Client,

    /// The server address to implicitly use for all requests.
    address: String,
}

impl TestReqwestClient {
    /// Construct a new test client that uses `address` for every request given.
    pub fn new(address: String) -> Self {
        let client = ClientBuilder::new()
            .redirect(redirect::Policy::none())
            .build()
            .expect("Could not build test client");
        Self { client, address }
    }

    /// Build the full URL of `path` on the test server.
    fn url(&self, path: &str) -> String {
        assert!(path.starts_with('/'));
        format!("http://{}{}", &self.address, path)
    }

    /// Start building a GET request to the test server with the path specified.
    ///
    /// The path should start with `/`, such as `/__heartbeat__`.
    pub fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path))
    }

    /// Start building a POST request to the test server that submits `form`
    /// as `application/x-www-form-urlencoded`.
    pub fn post_form<T: Serialize + ?Sized>(&self, path: &str, form: &T) -> RequestBuilder {
        self.client.post(self.url(path)).form(form)
    }
}
