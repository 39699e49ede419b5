//! The dispatched request, as seen by assertions.

use crate::body::Body;
use crate::expectation::{Captured, Expectation};
use crate::reporter::ReporterHandle;
use crate::transform::{capture_body, Step};
use http::header::HOST;
use http::Request;
use std::fmt;
use std::sync::Arc;

/// Assertions over a request that was sent to the handler.
///
/// Obtained from [`TestResponse::request`](crate::TestResponse::request).
#[derive(Clone)]
pub struct TestRequest {
    reporter: ReporterHandle,
    request: Arc<Request<Body>>,
}

impl TestRequest {
    pub(crate) fn new(reporter: ReporterHandle, request: Arc<Request<Body>>) -> Self {
        Self { reporter, request }
    }

    /// Expects on a request header.
    ///
    /// A missing header is a failure and yields an empty string. Repeated
    /// headers are joined with `", "`.
    pub fn header(&self, name: impl AsRef<str>) -> Expectation {
        let name = name.as_ref();
        let values: Vec<String> = self
            .request
            .headers()
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .collect();
        if values.is_empty() {
            self.reporter
                .error(&format!("expected request header: {name}"));
        }
        self.expect(Captured::new(values.join(", ")))
    }

    /// Expects on the full request body text. An absent body reads as `""`.
    ///
    /// Invalid UTF-8 is silently replaced with `U+FFFD`. Use
    /// `body_with([steps::read_text()])` to report it as a failure.
    pub fn body(&self) -> Expectation {
        self.body_with(Vec::new())
    }

    /// Expects on the request body after running it through `steps`.
    ///
    /// The first step receives a [`BodyReader`](crate::BodyReader).
    pub fn body_with(&self, steps: impl IntoIterator<Item = Step>) -> Expectation {
        let got = capture_body(self.reporter.as_ref(), self.request.body(), steps);
        self.expect(got)
    }

    /// Expects on the request host: the `Host` header, else the URI
    /// authority, else `""`.
    pub fn host(&self) -> Expectation {
        let host = self
            .request
            .headers()
            .get(HOST)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .or_else(|| self.request.uri().authority().map(|a| a.to_string()))
            .unwrap_or_default();
        self.expect(Captured::new(host))
    }

    /// Returns the underlying request.
    #[must_use]
    pub fn request(&self) -> &Request<Body> {
        &self.request
    }

    fn expect(&self, got: Captured) -> Expectation {
        Expectation::new(Arc::clone(&self.reporter), got)
    }
}

impl fmt::Debug for TestRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestRequest")
            .field("method", self.request.method())
            .field("uri", self.request.uri())
            .field("headers", self.request.headers())
            .field("body_len", &self.request.body().len())
            .finish()
    }
}
