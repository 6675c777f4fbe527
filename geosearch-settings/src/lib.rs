#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! # Geosearch Settings
//!
//! Configuration is specified in several ways, with later methods overriding earlier ones.
//!
//! 1. A base configuration checked into the repository, in `config/base.yaml`.
//!    This provides the default values for most settings.
//! 2. Per-environment configuration files in the `config` directory. The
//!    environment is selected using the environment variable `GEOSEARCH_ENV`.
//!    The settings for that environment are then loaded from
//!    `config/${env}.yaml`, if it exists. The default environment is
//!    "development". A "production" environment is also provided.
//! 3. A local configuration file not checked into the repository, at
//!    `config/local.yaml`. This file is in `.gitignore` and is safe to use for
//!    local configuration if desired.
//! 4. Environment variables that begin with `GEOSEARCH_` and use `__` as a
//!    separator between levels. For example, `Settings::http::workers` can be
//!    controlled from the environment variable `GEOSEARCH_HTTP__WORKERS`.
//!
//! Tests should use `Settings::load_for_tests` which only reads from
//! `config/base.yaml`, `config/test.yaml`, and `config/local_test.yaml` (if it
//! exists). It does not read from environment variables.
//!
//! Configuration files are canonically YAML files. However, any format supported
//! by the [config] crate can be used, including JSON and TOML. To choose another
//! format, simply use a different extension for your file, like
//! `config/local.toml`.

pub mod geocoder;
mod logging;

pub use geocoder::GeocoderConfig;
pub use logging::{DirectiveWrapper, LogFormat, LoggingSettings};

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Top level settings object for Geosearch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Settings {
    /// The environment Geosearch is running in. Should only be set with the
    /// `GEOSEARCH_ENV` environment variable.
    pub env: String,

    /// Enable additional features to debug the application, such as the fixed
    /// geocoder. This should not be set to true in production environments.
    pub debug: bool,

    /// Settings for the HTTP server.
    pub http: HttpSettings,

    /// Logging settings.
    pub logging: LoggingSettings,

    /// The geocoder that place searches are sent to.
    pub geocoder: GeocoderConfig,
}

/// Settings for the HTTP server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HttpSettings {
    /// The host and port to listen on, such as "127.0.0.1:8080" or "0.0.0.0:80".
    pub listen: SocketAddr,

    /// The number of workers to use. Optional. If no value is provided, the
    /// number of logical cores will be used.
    pub workers: Option<usize>,
}

impl Settings {
    /// Load settings from configuration files and environment variables.
    ///
    /// # Errors
    /// If any of the configured values are invalid, or if any of the required
    /// configuration files are missing.
    pub fn load() -> Result<Self, ConfigError> {
        let geosearch_env =
            std::env::var("GEOSEARCH_ENV").unwrap_or_else(|_| "development".to_string());

        let mut settings: Self = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name("./config/base"))
            // Merge in an environment specific config.
            .set_override("env", geosearch_env.as_str())?
            .add_source(File::with_name(&format!("config/{}", geosearch_env)).required(false))
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name("config/local").required(false))
            // Add environment variables that start with "GEOSEARCH_" and have
            // "__" to separate levels. For example, `GEOSEARCH_HTTP__LISTEN`
            // maps to `Settings::http::listen`.
            .add_source(
                Environment::with_prefix("GEOSEARCH")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        // RUST_LOG is added after the configured levels, so it wins.
        if let Ok(rust_log) = std::env::var("RUST_LOG") {
            settings
                .logging
                .levels
                .extend_from_rust_log(&rust_log)
                .map_err(|error| ConfigError::Message(format!("{:#}", error)))?;
        }

        Ok(settings)
    }

    /// Load settings from configuration files for tests.
    ///
    /// `changer` is called with the loaded settings before they are returned,
    /// so tests can adjust individual values.
    ///
    /// # Panics
    /// If the test configuration files are missing or invalid.
    pub fn load_for_tests<F: FnOnce(&mut Self)>(changer: F) -> Self {
        let config_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/../config");

        let mut settings: Self = Config::builder()
            // Start off with the base config.
            .add_source(File::with_name(&format!("{}/base", config_dir)))
            // Merge in test specific config.
            .add_source(File::with_name(&format!("{}/test", config_dir)))
            .set_override("env", "test")
            .expect("Could not set env for tests")
            // Add a local configuration file that is `.gitignore`ed.
            .add_source(File::with_name(&format!("{}/local_test", config_dir)).required(false))
            .build()
            .expect("Could not load settings for tests")
            .try_deserialize()
            .expect("Could not convert settings");

        changer(&mut settings);
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::Settings;
    use crate::{GeocoderConfig, LogFormat};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_settings_load() {
        let settings = Settings::load_for_tests(|_| ());
        assert_eq!(settings.env, "test");
        assert_eq!(settings.http.listen.port(), 0);
        assert!(matches!(settings.logging.format, LogFormat::Pretty));
    }

    #[test]
    fn test_geocoder_tree_is_timeout_around_nominatim() {
        let settings = Settings::load_for_tests(|_| ());
        let GeocoderConfig::Timeout(timeout) = settings.geocoder else {
            panic!("expected a timeout geocoder at the root");
        };
        assert_eq!(timeout.max_time, Duration::from_secs(5));
        let GeocoderConfig::Nominatim(nominatim) = *timeout.inner else {
            panic!("expected nominatim inside the timeout");
        };
        assert_eq!(nominatim.max_results, 5);
        assert_eq!(nominatim.user_agent, "Geosearch-Educational-App");
    }

    #[test]
    fn test_load_for_tests_ignores_rust_log() {
        // A hyphenated target is rejected by `Settings::load`, but must not
        // break test settings.
        std::env::set_var("RUST_LOG", "geosearch-web=debug");
        let settings = Settings::load_for_tests(|_| ());
        std::env::remove_var("RUST_LOG");
        assert_eq!(settings.logging.levels.directives(), ["INFO"]);
    }

    #[test]
    fn test_changer_is_applied() {
        let settings = Settings::load_for_tests(|settings| settings.debug = true);
        assert!(settings.debug);
    }
}
