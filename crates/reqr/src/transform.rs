//! Body transform chains.
//!
//! A chain is a list of [`Step`]s. Each step declares the type it accepts;
//! the chain itself is not checked when it is built. When the chain runs, every
//! step boundary checks the arriving value and a mismatch aborts the test.
//!
//! ```ignore
//! response
//!     .body_with([steps::json_value(), steps::json_field("user.name")])
//!     .equals(json!("Alice"));
//! ```

use crate::body::Body;
use crate::error::{ReqrError, ReqrResult};
use crate::expectation::Captured;
use crate::reporter::{OrFatal, Reporter};
use std::any::{type_name, Any};
use std::fmt;

/// What a step produced.
#[derive(Debug)]
pub enum StepOutput {
    /// The step succeeded; the value feeds the next step.
    Value(Captured),
    /// The step failed. The chain stops and `partial` becomes the final value.
    Failed {
        /// Whatever the step produced before failing.
        partial: Captured,
        /// Why the step failed.
        reason: String,
    },
}

type StepFn = Box<dyn Fn(Captured) -> Result<StepOutput, Captured>>;

/// One link of a transform chain.
pub struct Step {
    input: &'static str,
    run: StepFn,
}

impl Step {
    /// A fallible step. On error there is no partial output.
    pub fn new<A, B, E, F>(f: F) -> Self
    where
        A: Any,
        B: Any + fmt::Debug,
        E: fmt::Display,
        F: Fn(A) -> Result<B, E> + 'static,
    {
        Self::erase::<A, _>(move |a| match f(a) {
            Ok(b) => StepOutput::Value(Captured::new(b)),
            Err(e) => StepOutput::Failed {
                partial: Captured::absent(),
                reason: e.to_string(),
            },
        })
    }

    /// An infallible step.
    pub fn map<A, B, F>(f: F) -> Self
    where
        A: Any,
        B: Any + fmt::Debug,
        F: Fn(A) -> B + 'static,
    {
        Self::erase::<A, _>(move |a| StepOutput::Value(Captured::new(f(a))))
    }

    /// A step that always produces a value and may also report a failure.
    ///
    /// When it fails, the value it produced is what the expectation sees.
    pub fn partial<A, B, E, F>(f: F) -> Self
    where
        A: Any,
        B: Any + fmt::Debug,
        E: fmt::Display,
        F: Fn(A) -> (B, Option<E>) + 'static,
    {
        Self::erase::<A, _>(move |a| match f(a) {
            (b, None) => StepOutput::Value(Captured::new(b)),
            (b, Some(e)) => StepOutput::Failed {
                partial: Captured::new(b),
                reason: e.to_string(),
            },
        })
    }

    fn erase<A, F>(f: F) -> Self
    where
        A: Any,
        F: Fn(A) -> StepOutput + 'static,
    {
        Self {
            input: type_name::<A>(),
            run: Box::new(move |value| value.take::<A>().map(&f)),
        }
    }

    /// Returns the type name this step accepts.
    #[must_use]
    pub fn input_type(&self) -> &'static str {
        self.input
    }

    fn apply(&self, index: usize, value: Captured) -> ReqrResult<StepOutput> {
        (self.run)(value).map_err(|value| ReqrError::StepInputMismatch {
            index,
            expected: self.input,
            actual: value.type_name(),
        })
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step").field("input", &self.input).finish()
    }
}

/// Runs `steps` in order starting from `initial`.
///
/// The first failing step is reported as a soft failure and ends the chain;
/// its partial output is returned. An input type mismatch is fatal.
pub fn run(
    reporter: &dyn Reporter,
    initial: Captured,
    steps: impl IntoIterator<Item = Step>,
) -> Captured {
    let mut value = initial;
    for (index, step) in steps.into_iter().enumerate() {
        tracing::debug!(step = index, input = value.type_name(), "running transform step");
        match step.apply(index, value).or_fatal(reporter) {
            StepOutput::Value(next) => value = next,
            StepOutput::Failed { partial, reason } => {
                reporter.error(&format!("transform error: step {index}: {reason}"));
                return partial;
            }
        }
    }
    value
}

/// Captures a body for an expectation: its text when there are no steps,
/// otherwise the output of the chain started from a fresh reader.
pub(crate) fn capture_body(
    reporter: &dyn Reporter,
    body: &Body,
    steps: impl IntoIterator<Item = Step>,
) -> Captured {
    let steps: Vec<Step> = steps.into_iter().collect();
    if steps.is_empty() {
        return Captured::new(body.text());
    }
    run(reporter, Captured::new(body.reader()), steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::TestReporter;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting(calls: &Rc<Cell<usize>>) -> Step {
        let calls = Rc::clone(calls);
        Step::map(move |n: i64| {
            calls.set(calls.get() + 1);
            n + 1
        })
    }

    #[test]
    fn test_steps_compose_left_to_right() {
        let reporter = TestReporter::new("compose");
        let out = run(
            reporter.as_ref(),
            Captured::new(String::from("41")),
            [
                Step::new(|s: String| s.parse::<i64>()),
                Step::map(|n: i64| n + 1),
                Step::map(|n: i64| n.to_string()),
            ],
        );
        assert_eq!(out.as_text(), Some("42"));
        assert!(reporter.passed());
    }

    #[test]
    fn test_no_steps_returns_initial() {
        let reporter = TestReporter::new("empty");
        let out = run(reporter.as_ref(), Captured::new(7u8), Vec::new());
        assert_eq!(out.as_int(), Some(7));
    }

    #[test]
    fn test_failure_halts_chain() {
        let reporter = TestReporter::new("halt");
        let calls = Rc::new(Cell::new(0));
        let out = run(
            reporter.as_ref(),
            Captured::new(1i64),
            [
                counting(&calls),
                counting(&calls),
                Step::partial(|n: i64| (n * 10, Some("too big"))),
                counting(&calls),
                counting(&calls),
            ],
        );

        assert_eq!(calls.get(), 2);
        assert_eq!(out.downcast_ref::<i64>(), Some(&30));
        assert_eq!(
            reporter.take_failures(),
            vec!["transform error: step 2: too big"]
        );
    }

    #[test]
    fn test_failure_without_partial_is_absent() {
        let reporter = TestReporter::new("absent");
        let out = run(
            reporter.as_ref(),
            Captured::new(String::from("nope")),
            [Step::new(|s: String| s.parse::<i64>())],
        );
        assert!(out.is_absent());
        assert_eq!(reporter.take_failures().len(), 1);
    }

    #[test]
    #[should_panic(expected = "transform step 1: expected input of type alloc::string::String, got i64")]
    fn test_input_mismatch_is_fatal() {
        let reporter = TestReporter::new("mismatch");
        run(
            reporter.as_ref(),
            Captured::new(1i64),
            [Step::map(|n: i64| n), Step::map(|s: String| s.len())],
        );
    }

    #[test]
    fn test_input_type() {
        assert_eq!(Step::map(|n: u16| n).input_type(), "u16");
    }
}
