use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Mutex;

/// Severity levels of the message channel.
///
/// `Success` sits between `Info` and `Warning`: it marks the completion of
/// a user-visible step (an export written, an analysis produced) rather
/// than mere progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    /// Detailed internal information helpful when debugging.
    Debug,
    /// General application progress.
    Info,
    /// Completion of a user-visible step.
    Success,
    /// A potential problem that does not stop the run.
    Warning,
    /// A failure of some operation or component.
    Error,
}

impl Level {
    /// The uppercase label used in rendered messages, e.g. `WARNING`.
    pub fn label(self) -> &'static str {
        match self {
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Success => "SUCCESS",
            Level::Warning => "WARNING",
            Level::Error => "ERROR",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The leveled message channel capability.
///
/// Implementors only provide `record`; the per-level helpers are provided
/// so call sites read the same as with a concrete logger.
pub trait LogSink: Send + Sync {
    /// Records one message at the given level.
    fn record(&self, level: Level, message: &str);

    /// Records at [`Level::Debug`].
    fn debug(&self, message: &str) {
        self.record(Level::Debug, message);
    }

    /// Records at [`Level::Info`].
    fn info(&self, message: &str) {
        self.record(Level::Info, message);
    }

    /// Records at [`Level::Success`].
    fn success(&self, message: &str) {
        self.record(Level::Success, message);
    }

    /// Records at [`Level::Warning`].
    fn warn(&self, message: &str) {
        self.record(Level::Warning, message);
    }

    /// Records at [`Level::Error`].
    fn error(&self, message: &str) {
        self.record(Level::Error, message);
    }
}

/// An in-memory sink that stores every record it receives.
///
/// Used by the test suites to assert on reported attempts and failures,
/// and usable by host programs that want to collect messages instead of
/// printing them.
#[derive(Default)]
pub struct CaptureSink {
    records: Mutex<Vec<(Level, String)>>,
}

impl CaptureSink {
    /// Creates an empty capture sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all records received so far.
    pub fn records(&self) -> Vec<(Level, String)> {
        self.lock().clone()
    }

    /// Returns the messages only, in arrival order.
    pub fn messages(&self) -> Vec<String> {
        self.lock().iter().map(|(_, m)| m.clone()).collect()
    }

    /// Counts the records received at one level.
    pub fn count(&self, level: Level) -> usize {
        self.lock().iter().filter(|(l, _)| *l == level).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(Level, String)>> {
        match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl LogSink for CaptureSink {
    fn record(&self, level: Level, message: &str) {
        self.lock().push((level, message.to_string()));
    }
}
