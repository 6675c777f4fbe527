#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! Web server for [Geosearch](../geosearch/index.html)'s search page.

mod dockerflow;
mod errors;
mod logging;
mod page;
mod search;

use actix_web::{dev::Server, web::Data, App, HttpServer};
use anyhow::Context;
use geosearch_places::make_geocoder;
use geosearch_settings::Settings;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

use crate::{logging::GeosearchRootSpanBuilder, search::GeocoderRef};

/// Run the web server
///
/// The returned server is a `Future` that must either be `.await`ed, or run it
/// as a background task using `tokio::spawn`.
///
/// Most of the details from `settings` will be respected, except for those that
/// go into building the listener (the host and port). If you want to respect the
/// settings specified in that object, you must include them in the construction
/// of `listener`.
///
/// # Errors
///
/// Returns an error if the configured geocoder can't be set up, or if the
/// server cannot be started on the provided listener.
///
/// # Examples
///
/// Run the server in the foreground. This will only return if there is an error
/// that causes the server to shut down.
///
/// ```no_run
/// # actix_rt::System::new().block_on(async {
/// let listener = std::net::TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = geosearch_settings::Settings::load()
///     .expect("Failed to load settings");
/// geosearch_web::run(listener, settings)
///     .expect("Failed to start server")
///     .await
///     .expect("Fatal error while running server");
/// # })
/// ```
///
/// Run the server as a background task. This will return immediately and process
/// requests. This is useful for tests.
///
/// ```no_run
/// use std::net::TcpListener;
/// use geosearch_settings::Settings;
///
/// # actix_rt::System::new().block_on(async {
/// let listener = TcpListener::bind("127.0.0.1:8080")
///     .expect("Failed to bind port");
/// let settings = Settings::load()
///     .expect("Failed to load settings");
/// let server = geosearch_web::run(listener, settings)
///     .expect("Failed to start server");
///
/// // The server can be stopped with `join_handle.abort()`, if needed.
/// let join_handle = actix_rt::spawn(server);
/// # })
/// ```
pub fn run(listener: TcpListener, settings: Settings) -> anyhow::Result<Server> {
    let num_workers = settings.http.workers;

    let geocoder: GeocoderRef =
        make_geocoder(&settings, &settings.geocoder).context("Setting up the geocoder")?;
    tracing::info!(
        r#type = "web.configuring-geocoder",
        geocoder = %geocoder.name(),
        "Geocoder ready"
    );
    let geocoder = Data::new(geocoder);

    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(geocoder.clone())
            .wrap(TracingLogger::<GeosearchRootSpanBuilder>::new())
            // Add the behavior necessary to satisfy Dockerflow.
            .configure(dockerflow::configure)
            // The search form itself
            .configure(search::configure)
    })
    .listen(listener)
    .context("Listening for connections")?;

    if let Some(n) = num_workers {
        server = server.workers(n);
    }

    Ok(server.run())
}
