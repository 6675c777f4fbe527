#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A web page to look up the coordinates of places by name.
//!
//! Geosearch is split into several subcrates that work in collaboration.
//!
//! - [geosearch-integration-tests](../geosearch_integration_tests/index.html)
//! - [geosearch-places](../geosearch_places/index.html)
//! - [geosearch-settings](../geosearch_settings/index.html)
//! - [geosearch-web](../geosearch_web/index.html)

use anyhow::{Context, Result};
use geosearch_settings::{LogFormat, Settings};
use std::net::TcpListener;
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[actix_rt::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings)?;
    let listener = TcpListener::bind(settings.http.listen).context("Binding port")?;
    tracing::info!(
        r#type = "geosearch.starting",
        env = %settings.env,
        address = %settings.http.listen,
        "Starting Geosearch"
    );

    geosearch_web::run(listener, settings)
        .context("Starting geosearch-web server")?
        .await
        .context("Running geosearch-web server")?;

    Ok(())
}

/// Set up logging for Geosearch, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let env_filter: EnvFilter = (&settings.logging.levels).into();
    let registry = tracing_subscriber::registry().with(env_filter);

    match settings.logging.format {
        LogFormat::Pretty => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().pretty()),
        )?,
        LogFormat::Compact => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().compact()),
        )?,
        LogFormat::Json => tracing::subscriber::set_global_default(
            registry.with(tracing_subscriber::fmt::layer().json()),
        )?,
    };

    Ok(())
}
