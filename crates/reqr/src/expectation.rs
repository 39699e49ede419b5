//! Captured values and the checks run against them.

use crate::error::ReqrError;
use crate::reporter::{OrFatal, ReporterHandle};
use http::StatusCode;
use regex::Regex;
use std::any::{type_name, Any};
use std::fmt;

trait Erased: Any {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn type_name(&self) -> &'static str;
    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result;
}

impl<T: Any + fmt::Debug> Erased for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }

    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn fmt_debug(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A type-erased value carrying its runtime type name.
///
/// Captured values flow between transform steps and end up inside an
/// [`Expectation`]. A captured value may be absent, which is what a failing
/// step without partial output leaves behind.
pub struct Captured {
    inner: Option<Box<dyn Erased>>,
}

impl Captured {
    /// Captures a value.
    pub fn new<T: Any + fmt::Debug>(value: T) -> Self {
        Self {
            inner: Some(Box::new(value)),
        }
    }

    /// The absent value.
    #[must_use]
    pub const fn absent() -> Self {
        Self { inner: None }
    }

    /// Returns true if there is no value.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.inner.is_none()
    }

    /// Returns the runtime type name, or `<absent>`.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.inner.as_deref().map_or("<absent>", Erased::type_name)
    }

    /// Borrows the value as `T` if that is its type.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_deref()?.as_any().downcast_ref()
    }

    /// Takes the value out as `T`, or hands it back unchanged.
    pub fn take<T: Any>(self) -> Result<T, Self> {
        if self.downcast_ref::<T>().is_none() {
            return Err(self);
        }
        match self.inner.map(|v| v.into_any().downcast::<T>()) {
            Some(Ok(v)) => Ok(*v),
            _ => Err(Self::absent()),
        }
    }

    /// Returns the value as text if it is `String`, `&str` or `Box<str>`.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        text_of(self.inner.as_deref()?.as_any())
    }

    /// Returns the value as an integer if it is any primitive integer or a
    /// status code.
    #[must_use]
    pub fn as_int(&self) -> Option<i128> {
        int_of(self.inner.as_deref()?.as_any())
    }

    /// Structural equality against `want`.
    ///
    /// Text compares as text and integers compare numerically whatever
    /// their concrete representation; any other pair must share a type.
    pub fn matches<T: Any + PartialEq>(&self, want: &T) -> bool {
        let want_any: &dyn Any = want;
        if let (Some(got), Some(want)) = (self.as_text(), text_of(want_any)) {
            return got == want;
        }
        if let (Some(got), Some(want)) = (self.as_int(), int_of(want_any)) {
            return got == want;
        }
        self.downcast_ref::<T>() == Some(want)
    }
}

impl fmt::Debug for Captured {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.as_deref() {
            Some(v) => v.fmt_debug(f),
            None => f.write_str("<absent>"),
        }
    }
}

fn text_of(value: &dyn Any) -> Option<&str> {
    if let Some(s) = value.downcast_ref::<String>() {
        return Some(s);
    }
    if let Some(s) = value.downcast_ref::<&'static str>() {
        return Some(s);
    }
    value.downcast_ref::<Box<str>>().map(AsRef::as_ref)
}

macro_rules! int_from {
    ($value:expr, $($ty:ty),+) => {
        $(
            if let Some(n) = $value.downcast_ref::<$ty>() {
                return i128::try_from(*n).ok();
            }
        )+
    };
}

fn int_of(value: &dyn Any) -> Option<i128> {
    int_from!(value, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);
    value
        .downcast_ref::<StatusCode>()
        .map(|s| i128::from(s.as_u16()))
}

/// Checks against one captured value.
///
/// Failed checks are reported as soft failures; misuse (a pattern that does
/// not compile, `contains` on a non-text value) aborts the test.
pub struct Expectation {
    reporter: ReporterHandle,
    got: Captured,
}

impl Expectation {
    pub(crate) fn new(reporter: ReporterHandle, got: Captured) -> Self {
        Self { reporter, got }
    }

    /// Returns the captured value.
    #[must_use]
    pub fn captured(&self) -> &Captured {
        &self.got
    }

    /// Consumes the expectation, returning the captured value.
    pub fn into_captured(self) -> Captured {
        self.got
    }

    /// Expects the captured value to equal `want`.
    ///
    /// `want` must be `'static`, so borrowed text such as `name.as_str()` is
    /// not accepted here; use [`equals_text`](Self::equals_text) for it.
    pub fn equals<T>(&self, want: T) -> &Self
    where
        T: Any + PartialEq + fmt::Debug,
    {
        if !self.got.matches(&want) {
            self.reporter
                .error(&format!("expected {want:?}, got {:?}", self.got));
        }
        self
    }

    /// Expects the captured value to be text equal to `want`.
    pub fn equals_text(&self, want: impl AsRef<str>) -> &Self {
        let want = want.as_ref();
        if self.got.as_text() != Some(want) {
            self.reporter
                .error(&format!("expected {want:?}, got {:?}", self.got));
        }
        self
    }

    /// Expects the captured text to match the regular expression `pattern`
    /// somewhere.
    pub fn contains(&self, pattern: impl AsRef<str>) -> &Self {
        let pattern = pattern.as_ref();
        let Some(text) = self.got.as_text() else {
            self.reporter.fatal(
                &ReqrError::NotText {
                    check: "contains",
                    actual: self.got.type_name(),
                }
                .to_string(),
            );
        };
        let re = Regex::new(pattern)
            .map_err(ReqrError::from)
            .or_fatal(self.reporter.as_ref());
        if !re.is_match(text) {
            self.reporter
                .error(&format!("expected {text:?} to contain {pattern:?}"));
        }
        self
    }
}

impl fmt::Debug for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Expectation").field("got", &self.got).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::TestReporter;
    use serde_json::json;
    use std::sync::Arc;

    fn expect<T: Any + fmt::Debug>(reporter: &Arc<TestReporter>, value: T) -> Expectation {
        Expectation::new(reporter.clone(), Captured::new(value))
    }

    #[test]
    fn test_text_equality_across_representations() {
        let reporter = TestReporter::new("text");
        expect(&reporter, String::from("ok"))
            .equals("ok")
            .equals(String::from("ok"));
        assert!(reporter.passed());
    }

    #[test]
    fn test_int_equality_across_widths() {
        let reporter = TestReporter::new("int");
        expect(&reporter, 200u16)
            .equals(200)
            .equals(200u64)
            .equals(StatusCode::OK);
        assert!(reporter.passed());
    }

    #[test]
    fn test_structural_equality() {
        let reporter = TestReporter::new("json");
        expect(&reporter, json!({"a": [1, 2]})).equals(json!({"a": [1, 2]}));
        assert!(reporter.passed());
    }

    #[test]
    fn test_mismatch_records_one_failure() {
        let reporter = TestReporter::new("mismatch");
        expect(&reporter, String::from("pong")).equals("wrong");
        assert_eq!(
            reporter.take_failures(),
            vec![r#"expected "wrong", got "pong""#]
        );
    }

    #[test]
    fn test_type_mismatch_is_soft_failure() {
        let reporter = TestReporter::new("types");
        expect(&reporter, json!(1)).equals(vec![1]);
        assert_eq!(reporter.take_failures().len(), 1);
    }

    #[test]
    fn test_absent_equals_nothing() {
        let reporter = TestReporter::new("absent");
        Expectation::new(reporter.clone(), Captured::absent()).equals("");
        assert_eq!(reporter.take_failures(), vec![r#"expected "", got <absent>"#]);
    }

    #[test]
    fn test_equals_text_accepts_borrowed_text() {
        let reporter = TestReporter::new("borrowed");
        let name = format!("{}-{}", "pong", 1);
        expect(&reporter, String::from("pong-1")).equals_text(name.as_str());
        assert!(reporter.passed());

        expect(&reporter, 7u8).equals_text(name.as_str());
        assert_eq!(
            reporter.take_failures(),
            vec![r#"expected "pong-1", got 7"#]
        );
    }

    #[test]
    fn test_contains_matches_substring() {
        let reporter = TestReporter::new("contains");
        expect(&reporter, String::from("pong")).contains("^po").contains("ng$");
        assert!(reporter.passed());
    }

    #[test]
    fn test_contains_non_match() {
        let reporter = TestReporter::new("contains_miss");
        expect(&reporter, String::from("pong")).contains("^x");
        assert_eq!(
            reporter.take_failures(),
            vec![r#"expected "pong" to contain "^x""#]
        );
    }

    #[test]
    #[should_panic(expected = "invalid pattern")]
    fn test_contains_invalid_pattern_is_fatal() {
        let reporter = TestReporter::new("bad_pattern");
        expect(&reporter, String::from("pong")).contains("(");
    }

    #[test]
    #[should_panic(expected = "contains: captured value of type u16 is not text")]
    fn test_contains_on_non_text_is_fatal() {
        let reporter = TestReporter::new("non_text");
        expect(&reporter, 200u16).contains("2");
    }

    #[test]
    fn test_take() {
        let captured = Captured::new(json!({"a": 1}));
        assert_eq!(Captured::new(7u16).type_name(), "u16");
        let captured = captured.take::<String>().unwrap_err();
        assert_eq!(captured.take::<serde_json::Value>().unwrap(), json!({"a": 1}));
    }
}
