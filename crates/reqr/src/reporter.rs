//! Test outcome reporting.
//!
//! Rust's test harness only knows about panics, so soft failures are collected
//! by the reporter and surfaced when the test ends. Fatal failures panic on
//! the spot.
//!
//! Every dispatcher, wrapper, and expectation holds a [`ReporterHandle`] to the
//! reporter of the test that created it.

use crate::error::ReqrError;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;

/// Shared handle to the reporter of the current test.
pub type ReporterHandle = Arc<dyn Reporter>;

/// A sink for test failures.
pub trait Reporter: Send + Sync {
    /// Records a failure and lets the test continue.
    fn error(&self, message: &str);

    /// Records a failure and aborts the test.
    fn fatal(&self, message: &str) -> !;
}

/// The default reporter: collects soft failures, panics on fatal ones.
///
/// In strict mode a reporter that still holds failures when dropped panics with
/// all of them, which is what makes soft failures fail the test. Tests that
/// expect failures call [`take_failures`](Self::take_failures) to claim them.
///
/// # Example
///
/// ```ignore
/// let reporter = TestReporter::new("ping");
/// let reqr = Reqr::new(handler, reporter.clone());
/// reqr.get("/ping", []).status().equals(200);
/// ```
pub struct TestReporter {
    name: String,
    strict: bool,
    failures: Mutex<Vec<String>>,
}

impl TestReporter {
    /// Creates a strict reporter for the named test.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Arc<Self> {
        Self::with_strict(name, true)
    }

    /// Creates a reporter with an explicit strictness.
    #[must_use]
    pub fn with_strict(name: impl Into<String>, strict: bool) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            strict,
            failures: Mutex::new(Vec::new()),
        })
    }

    /// Returns the test name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns a copy of the failures recorded so far.
    #[must_use]
    pub fn failures(&self) -> Vec<String> {
        self.failures.lock().clone()
    }

    /// Returns true if nothing has failed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.failures.lock().is_empty()
    }

    /// Drains the recorded failures.
    pub fn take_failures(&self) -> Vec<String> {
        std::mem::take(&mut *self.failures.lock())
    }
}

impl Reporter for TestReporter {
    fn error(&self, message: &str) {
        tracing::warn!(test = %self.name, failure = %message, "assertion failed");
        self.failures.lock().push(message.to_string());
    }

    fn fatal(&self, message: &str) -> ! {
        tracing::error!(test = %self.name, failure = %message, "fatal test fault");
        self.failures.lock().push(message.to_string());
        panic!("{}: {message}", self.name);
    }
}

impl fmt::Debug for TestReporter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestReporter")
            .field("name", &self.name)
            .field("strict", &self.strict)
            .field("failures", &self.failures.lock().len())
            .finish()
    }
}

impl Drop for TestReporter {
    fn drop(&mut self) {
        if !self.strict || std::thread::panicking() {
            return;
        }
        let failures = self.failures.get_mut();
        if !failures.is_empty() {
            panic!(
                "{}: {} assertion(s) failed:\n  {}",
                self.name,
                failures.len(),
                failures.join("\n  ")
            );
        }
    }
}

/// Turns a usage error into a fatal report.
pub trait OrFatal<T> {
    /// Returns the value, or aborts the test through the reporter.
    fn or_fatal(self, reporter: &dyn Reporter) -> T;
}

impl<T> OrFatal<T> for Result<T, ReqrError> {
    fn or_fatal(self, reporter: &dyn Reporter) -> T {
        match self {
            Ok(value) => value,
            Err(e) => reporter.fatal(&e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_records_and_continues() {
        let reporter = TestReporter::new("soft");
        reporter.error("first");
        reporter.error("second");
        assert!(!reporter.passed());
        assert_eq!(reporter.take_failures(), vec!["first", "second"]);
        assert!(reporter.passed());
    }

    #[test]
    #[should_panic(expected = "hard: boom")]
    fn test_fatal_panics() {
        let reporter = TestReporter::new("hard");
        reporter.fatal("boom");
    }

    #[test]
    #[should_panic(expected = "1 assertion(s) failed")]
    fn test_strict_drop_panics_on_unclaimed_failures() {
        let reporter = TestReporter::new("strict");
        reporter.error("unclaimed");
    }

    #[test]
    fn test_lenient_drop_ignores_failures() {
        let reporter = TestReporter::with_strict("lenient", false);
        reporter.error("ignored");
        assert_eq!(reporter.failures().len(), 1);
    }

    #[test]
    #[should_panic(expected = "invalid pattern")]
    fn test_or_fatal() {
        let reporter = TestReporter::new("or_fatal");
        regex::Regex::new("(")
            .map_err(ReqrError::from)
            .or_fatal(reporter.as_ref());
    }
}
