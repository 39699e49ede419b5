//! Recorded handler responses.

use crate::body::Body;
use crate::expectation::{Captured, Expectation};
use crate::reporter::ReporterHandle;
use crate::request::TestRequest;
use crate::transform::{capture_body, Step};
use http::{HeaderMap, Request, Response, StatusCode};
use std::fmt;
use std::sync::Arc;

/// A recorded response together with the request that produced it.
pub struct TestResponse {
    reporter: ReporterHandle,
    request: Arc<Request<Body>>,
    /// HTTP status code
    status: StatusCode,
    /// Response headers
    headers: HeaderMap,
    /// Response body
    body: Body,
}

impl TestResponse {
    /// Records a handler response.
    pub(crate) fn from_http(
        reporter: ReporterHandle,
        request: Arc<Request<Body>>,
        response: Response<Body>,
    ) -> Self {
        let (parts, body) = response.into_parts();
        Self {
            reporter,
            request,
            status: parts.status,
            headers: parts.headers,
            body,
        }
    }

    /// Expects on the numeric status code.
    pub fn status(&self) -> Expectation {
        self.expect(Captured::new(self.status.as_u16()))
    }

    /// Expects on the first value of a response header.
    ///
    /// A missing header yields `""` and is not a failure.
    pub fn header(&self, name: impl AsRef<str>) -> Expectation {
        let value = self
            .headers
            .get(name.as_ref())
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
            .unwrap_or_default();
        self.expect(Captured::new(value))
    }

    /// Expects on the recorded body text.
    ///
    /// Invalid UTF-8 is silently replaced with `U+FFFD`. Use
    /// `body_with([steps::read_text()])` to report it as a failure.
    pub fn body(&self) -> Expectation {
        self.body_with(Vec::new())
    }

    /// Expects on the recorded body after running it through `steps`.
    ///
    /// The first step receives a [`BodyReader`](crate::BodyReader).
    pub fn body_with(&self, steps: impl IntoIterator<Item = Step>) -> Expectation {
        let got = capture_body(self.reporter.as_ref(), &self.body, steps);
        self.expect(got)
    }

    /// Wraps the request that produced this response.
    pub fn request(&self) -> TestRequest {
        TestRequest::new(Arc::clone(&self.reporter), Arc::clone(&self.request))
    }

    /// Returns the raw status code.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    /// Returns the raw headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw body.
    #[must_use]
    pub fn raw_body(&self) -> &Body {
        &self.body
    }

    fn expect(&self, got: Captured) -> Expectation {
        Expectation::new(Arc::clone(&self.reporter), got)
    }
}

impl fmt::Debug for TestResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("body_len", &self.body.len())
            .finish()
    }
}
