//! Settings for log levels and formats.

use anyhow::{bail, Context};
use serde::{de, ser::SerializeSeq, Deserialize, Serialize};
use std::{ops::AddAssign, str::FromStr};
use tracing_subscriber::{filter::Directive, EnvFilter};

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// The minimum level that logs should be reported at.
    ///
    /// Each entry can be one of `ERROR`, `WARN`, `INFO`, `DEBUG`, or `TRACE` (in
    /// increasing verbosity), with an optional component that specifies the
    /// source of the logs.
    ///
    /// The environment variable `GEOSEARCH_LOGGING__LEVELS` completely
    /// overrides the config file. [`Settings::load`](crate::Settings::load)
    /// adds the contents of `RUST_LOG` after, and so they take precedence.
    ///
    /// # Examples
    ///
    /// The configurations below are identical
    ///
    /// ```yaml
    /// # config/local.yaml
    /// logging:
    ///   levels:
    ///     - INFO                  # default to INFO
    ///     - geosearch_web=DEBUG   # noisier logs from geosearch_web
    ///     - hyper=WARN            # hyper's INFO level is too noisy
    /// ```
    ///
    /// ```shell
    /// RUST_LOG=INFO,geosearch_web=DEBUG,hyper=WARN
    /// ```
    pub levels: DirectiveWrapper,

    /// The format to output logs in.
    pub format: LogFormat,
}

/// The output format of log lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// [`tracing-subscriber`]'s human targeted, pretty format. Includes more
    /// information, multiple lines per log event.
    Pretty,

    /// Newline delimited JSON, one object per log event. Meant for log
    /// collectors.
    Json,

    /// [`tracing-subscriber`]'s default format. One line per log event.
    Compact,
}

/// Tracing's Directive object for filter logs isn't `Clone` or `Serializable`.
/// Make a wrapper for a collection of Directives so that we can work more easily
/// with it.
///
/// This struct can be deserialized from either a comma separated string of
/// directives (`"INFO,component1=WARN"`), or from a sequence of comma separated
/// strings (`["INFO", "component1=WARN,component2=DEBUG"]`). This is important
/// because the config files use sequences, but environment variables are always
/// strings.
///
/// Every entry in this struct is guaranteed to be parsable as a valid Directive.
#[derive(Debug, Clone, PartialEq)]
pub struct DirectiveWrapper(Vec<String>);

impl DirectiveWrapper {
    /// The directives, in the order they will be applied.
    pub fn directives(&self) -> &[String] {
        &self.0
    }

    /// Append the directives of a `RUST_LOG` value, so they take precedence
    /// over the configured ones.
    ///
    /// # Errors
    /// If `rust_log` isn't a valid list of directives. Nothing is appended then.
    pub fn extend_from_rust_log(&mut self, rust_log: &str) -> anyhow::Result<()> {
        let from_env: Self = rust_log
            .parse()
            .with_context(|| format!("Invalid RUST_LOG {:?}", rust_log))?;
        *self += from_env;
        Ok(())
    }
}

impl Serialize for DirectiveWrapper {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(self.0.len()))?;
        for directive in &self.0 {
            seq.serialize_element(&directive)?;
        }
        seq.end()
    }
}

impl<'de> Deserialize<'de> for DirectiveWrapper {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;

        impl<'de> de::Visitor<'de> for Visitor {
            type Value = DirectiveWrapper;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "directive or list of directives")
            }

            fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                s.parse().map_err(|_err| {
                    de::Error::invalid_value(de::Unexpected::Str(s), &"valid directive")
                })
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: de::SeqAccess<'de>,
            {
                let mut rv = DirectiveWrapper(vec![]);

                while let Some(item) = seq.next_element::<String>()? {
                    let parsed: DirectiveWrapper = item.parse().map_err(|err: anyhow::Error| {
                        de::Error::invalid_value(
                            de::Unexpected::Str(&item),
                            &err.to_string().as_str(),
                        )
                    })?;
                    rv += parsed;
                }

                Ok(rv)
            }
        }

        deserializer.deserialize_any(Visitor)
    }
}

impl FromStr for DirectiveWrapper {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<String> = s
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(ToString::to_string)
            .collect();

        // Test that each part can be parsed as a logging filter directive.
        if let Some(err) = parts.iter().find_map(|p| p.parse::<Directive>().err()) {
            return Err(err).context("valid syntax");
        }

        // directives with hyphens in them are foot-guns for us
        if parts.iter().any(|p| p.contains('-')) {
            bail!("log targets must not include hyphens");
        }

        Ok(Self(parts))
    }
}

impl AddAssign for DirectiveWrapper {
    fn add_assign(&mut self, rhs: Self) {
        self.0.extend(rhs.0)
    }
}

impl From<&DirectiveWrapper> for EnvFilter {
    fn from(val: &DirectiveWrapper) -> Self {
        val.0
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(EnvFilter::default(), EnvFilter::add_directive)
    }
}

#[cfg(test)]
mod tests {
    use super::DirectiveWrapper;
    use parameterized::parameterized;
    use pretty_assertions::assert_eq;

    #[parameterized(input = {
        "INFO",
        "INFO,geosearch_web=DEBUG",
        " WARN , actix_server=ERROR "
    }, expected = {
        vec!["INFO"],
        vec!["INFO", "geosearch_web=DEBUG"],
        vec!["WARN", "actix_server=ERROR"]
    })]
    fn test_parse_valid(input: &str, expected: Vec<&str>) {
        let parsed: DirectiveWrapper = input.parse().expect("directive should parse");
        pretty_assertions::assert_eq!(parsed.directives(), expected.as_slice());
    }

    #[parameterized(input = { "geosearch-web=DEBUG", "INFO,geosearch_web=LOUD" })]
    fn test_parse_invalid(input: &str) {
        assert!(input.parse::<DirectiveWrapper>().is_err());
    }

    #[test]
    fn test_deserialize_from_sequence() {
        let parsed: DirectiveWrapper =
            serde_json::from_value(serde_json::json!(["INFO", "hyper=WARN,geosearch_web=DEBUG"]))
                .expect("sequence should deserialize");
        assert_eq!(parsed.directives(), ["INFO", "hyper=WARN", "geosearch_web=DEBUG"]);
    }

    #[test]
    fn test_rust_log_goes_last() {
        let mut levels: DirectiveWrapper = "INFO".parse().expect("directive should parse");
        levels
            .extend_from_rust_log("geosearch_places=TRACE")
            .expect("RUST_LOG should parse");
        assert_eq!(levels.directives(), ["INFO", "geosearch_places=TRACE"]);
    }

    #[test]
    fn test_bad_rust_log_changes_nothing() {
        let mut levels: DirectiveWrapper = "INFO".parse().expect("directive should parse");
        assert!(levels.extend_from_rust_log("geosearch-web=debug").is_err());
        assert_eq!(levels.directives(), ["INFO"]);
    }
}
