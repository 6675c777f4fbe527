//! Testing utilities to work with logs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};
use std::{
    collections::HashMap,
    io::Write,
    ops::Deref,
    sync::{Arc, Mutex},
};
use tracing::Level;

/// Helper to collect events emitted by Tracing and later make assertions about
/// the collected events.
///
/// The server under test logs from its own worker threads, so logs are
/// collected by a process-wide subscriber. Every watcher sees the events of
/// every test that has run so far; tests should look for something unique to
/// themselves, such as the text they searched for.
#[derive(Clone, Default)]
pub struct LogWatcher {
    /// The raw bytes received from Tracing. Should represent new-line separated JSON objects.
    buf: Arc<Mutex<Vec<u8>>>,
}

impl LogWatcher {
    /// Make a writer that appends to this watcher's buffer, to hand to Tracing.
    pub fn make_writer(&self) -> LogWatcherWriter {
        LogWatcherWriter {
            buf: self.buf.clone(),
        }
    }

    /// The complete events collected so far by this log watcher.
    ///
    /// A trailing partial line, from a write still in progress, is skipped.
    pub fn events(&self) -> Vec<TracingJsonEvent> {
        let buf = self.buf.lock().expect("mutex was poisoned");
        let log_text = String::from_utf8_lossy(&buf);

        let complete = match log_text.rfind('\n') {
            Some(idx) => &log_text[..idx],
            None => "",
        };

        complete
            .lines()
            // Skip blank lines
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str(line)
                    .unwrap_or_else(|_| panic!("Bad JSON in log line: {}", line))
            })
            .collect()
    }

    /// Test if any event this logger received matches `predicate`.
    #[must_use = "LogWatcher::has does not make assertions alone, you probably want to wrap it in assert!()"]
    pub fn has<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&TracingJsonEvent) -> bool,
    {
        self.events().iter().any(predicate)
    }
}

/// A helper that collects log events emitted from Tracing.
///
/// This is needed because Tracing consumes its subscribers. This type is a
/// "scout" that is split off from the main [`LogWatcher`] to give to Tracing,
/// and the data is written back to the parent type.
#[derive(Clone)]
pub struct LogWatcherWriter {
    /// The handle to the parent log watcher's buffer.
    buf: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogWatcherWriter {
    fn write(&mut self, new_bytes: &[u8]) -> std::io::Result<usize> {
        let mut buf = self
            .buf
            .lock()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
        buf.extend(new_bytes.iter());
        Ok(new_bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// A deserialization of [`tracing_subscriber::fmt::format::Json`]'s output format.
#[serde_as]
#[derive(Debug, Deserialize, Serialize)]
pub struct TracingJsonEvent {
    /// The key-value fields logged on the event, usually including `message`.
    pub fields: HashMap<String, Value>,
    /// The level the event was emitted at.
    #[serde_as(as = "DisplayFromStr")]
    pub level: Level,
    /// The target of the event.
    pub target: String,
    /// The time the event was emitted.
    pub timestamp: String,
}

impl TracingJsonEvent {
    /// Test if the field named `field_name` is a string that contains `pat` as a
    /// substring.
    pub fn field_contains<'a, S>(&'a self, field_name: &'a str, pat: S) -> bool
    where
        S: Deref<Target = str>,
    {
        self.fields
            .get(field_name)
            .and_then(serde_json::Value::as_str)
            .map_or(false, |value| value.contains(&*pat))
    }
}

#[cfg(test)]
mod tests {
    use super::LogWatcher;
    use std::io::Write;
    use tracing::Level;

    #[test]
    fn test_events_skip_partial_lines() {
        let watcher = LogWatcher::default();
        let mut writer = watcher.make_writer();
        writer
            .write_all(
                concat!(
                    r#"{"timestamp":"t","level":"INFO","fields":{"message":"Request success"},"target":"geosearch_web"}"#,
                    "\n\n",
                    r#"{"timestamp":"t","level":"WA"#,
                )
                .as_bytes(),
            )
            .expect("write should work");

        let events = watcher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::INFO);
        assert!(events[0].field_contains("message", "success"));
        assert!(!events[0].field_contains("message", "failure"));
        assert!(!events[0].field_contains("missing", "success"));
    }
}
