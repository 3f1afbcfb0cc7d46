//! Failure reporting for assertions.
//!
//! Every assertion reports through a [`Reporter`]. Soft failures go to
//! [`Reporter::error`] and let the chain continue; hard failures go to
//! [`Reporter::fatal`], which never returns.

use parking_lot::Mutex;

/// Sink for assertion failures.
pub trait Reporter: Send + Sync {
    /// Record a failure and continue.
    fn error(&self, message: &str);

    /// Record a failure and abort the current test.
    fn fatal(&self, message: &str) -> !;

    /// Whether any failure has been recorded.
    fn failed(&self) -> bool;
}

/// Default reporter: soft failures are collected and raised as a single panic
/// when the reporter is dropped, fatal failures panic immediately.
#[derive(Debug, Default)]
pub struct PanicReporter {
    failures: Mutex<Vec<String>>,
}

impl PanicReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Reporter for PanicReporter {
    fn error(&self, message: &str) {
        tracing::error!(failure = %message, "check failed");
        self.failures.lock().push(message.to_string());
    }

    #[allow(clippy::panic)]
    fn fatal(&self, message: &str) -> ! {
        tracing::error!(failure = %message, "check failed fatally");
        let mut failures = std::mem::take(&mut *self.failures.lock());
        failures.push(message.to_string());
        panic!("{}", failures.join("\n"));
    }

    fn failed(&self) -> bool {
        !self.failures.lock().is_empty()
    }
}

impl Drop for PanicReporter {
    #[allow(clippy::panic)]
    fn drop(&mut self) {
        let failures = std::mem::take(self.failures.get_mut());
        if !failures.is_empty() && !std::thread::panicking() {
            panic!("{}", failures.join("\n"));
        }
    }
}

/// Reporter that keeps every failure for later inspection.
///
/// Soft failures never panic. `fatal` still panics after recording, since it
/// must not return.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    failures: Mutex<Vec<String>>,
}

impl RecordingReporter {
    /// Create an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }
}

impl Reporter for RecordingReporter {
    fn error(&self, message: &str) {
        self.failures.lock().push(message.to_string());
    }

    #[allow(clippy::panic)]
    fn fatal(&self, message: &str) -> ! {
        self.failures.lock().push(message.to_string());
        panic!("{message}");
    }

    fn failed(&self) -> bool {
        !self.failures.lock().is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recording_reporter_collects() {
        let reporter = RecordingReporter::new();
        assert!(!reporter.failed());

        reporter.error("first");
        reporter.error("second");

        assert!(reporter.failed());
        assert_eq!(reporter.failures(), vec!["first", "second"]);
    }

    #[test]
    #[should_panic(expected = "stop here")]
    fn test_recording_reporter_fatal_panics() {
        let reporter = RecordingReporter::new();
        reporter.fatal("stop here");
    }

    #[test]
    fn test_panic_reporter_without_failures_drops_quietly() {
        let reporter = PanicReporter::new();
        assert!(!reporter.failed());
        drop(reporter);
    }

    #[test]
    #[should_panic(expected = "header missing")]
    fn test_panic_reporter_panics_on_drop() {
        let reporter = PanicReporter::new();
        reporter.error("header missing");
        assert!(reporter.failed());
    }

    #[test]
    #[should_panic(expected = "soft\nhard")]
    fn test_panic_reporter_fatal_includes_earlier_failures() {
        let reporter = PanicReporter::new();
        reporter.error("soft");
        reporter.fatal("hard");
    }
}
