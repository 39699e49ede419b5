//! In-process dispatch of requests to a handler under test.

use crate::body::{Body, Payload};
use crate::config::ReqrConfig;
use crate::customize::{parse_header, Customizer};
use crate::error::{ReqrError, ReqrResult};
use crate::reporter::{OrFatal, ReporterHandle};
use crate::response::TestResponse;
use http::header::HOST;
use http::{HeaderMap, HeaderValue, Method, Request, Response, Uri};
use std::fmt;
use std::sync::Arc;

/// The handler under test.
///
/// Implemented for every `Fn(&Request<Body>) -> Response<Body>`.
pub trait Handler {
    /// Handles one request.
    fn handle(&self, request: &Request<Body>) -> Response<Body>;
}

impl<F> Handler for F
where
    F: Fn(&Request<Body>) -> Response<Body>,
{
    fn handle(&self, request: &Request<Body>) -> Response<Body> {
        self(request)
    }
}

/// Sends requests to a handler and records the responses.
///
/// No listener is started and nothing touches the network: the handler is
/// called directly on the test's thread.
///
/// # Example
///
/// ```ignore
/// use reqr::{Body, Reqr, TestReporter};
/// use http::{Request, Response};
///
/// let reporter = TestReporter::new("ping");
/// let reqr = Reqr::new(
///     |_: &Request<Body>| Response::new(Body::from("pong")),
///     reporter.clone(),
/// );
///
/// let response = reqr.get("/ping", []);
/// response.status().equals(200);
/// response.body().contains("^po");
/// ```
pub struct Reqr {
    /// The handler under test.
    handler: Box<dyn Handler>,
    reporter: ReporterHandle,
    /// Headers added to every request before customizers run.
    default_headers: HeaderMap,
    default_host: Option<HeaderValue>,
}

impl Reqr {
    /// Creates a dispatcher for `handler` reporting to `reporter`.
    pub fn new<H>(handler: H, reporter: ReporterHandle) -> Self
    where
        H: Handler + 'static,
    {
        Self {
            handler: Box::new(handler),
            reporter,
            default_headers: HeaderMap::new(),
            default_host: None,
        }
    }

    /// Applies default headers and host from a configuration.
    ///
    /// Invalid header names or values are fatal.
    pub fn with_config(mut self, config: &ReqrConfig) -> Self {
        for (name, value) in &config.default_headers {
            self = self.with_default_header(name, value);
        }
        if let Some(host) = &config.default_host {
            let host = HeaderValue::try_from(host.as_str())
                .map_err(|e| ReqrError::invalid_header(HOST.as_str(), e))
                .or_fatal(self.reporter.as_ref());
            self.default_host = Some(host);
        }
        self
    }

    /// Adds a header that will be included in all requests.
    pub fn with_default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let (name, value) =
            parse_header(name.as_ref(), value.as_ref()).or_fatal(self.reporter.as_ref());
        self.default_headers.insert(name, value);
        self
    }

    /// Returns the reporter this dispatcher writes to.
    #[must_use]
    pub fn reporter(&self) -> &ReporterHandle {
        &self.reporter
    }

    /// Sends a GET request.
    pub fn get(
        &self,
        path: impl AsRef<str>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        self.dispatch(Method::GET.as_str(), path, Payload::Absent, customizers)
    }

    /// Sends a POST request.
    pub fn post(
        &self,
        path: impl AsRef<str>,
        payload: impl Into<Payload>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        self.dispatch(Method::POST.as_str(), path, payload, customizers)
    }

    /// Sends a PUT request.
    pub fn put(
        &self,
        path: impl AsRef<str>,
        payload: impl Into<Payload>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        self.dispatch(Method::PUT.as_str(), path, payload, customizers)
    }

    /// Sends a PATCH request.
    pub fn patch(
        &self,
        path: impl AsRef<str>,
        payload: impl Into<Payload>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        self.dispatch(Method::PATCH.as_str(), path, payload, customizers)
    }

    /// Sends a DELETE request.
    pub fn delete(
        &self,
        path: impl AsRef<str>,
        payload: impl Into<Payload>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        self.dispatch(Method::DELETE.as_str(), path, payload, customizers)
    }

    /// Sends an OPTIONS request.
    pub fn options(
        &self,
        path: impl AsRef<str>,
        payload: impl Into<Payload>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        self.dispatch(Method::OPTIONS.as_str(), path, payload, customizers)
    }

    /// Sends a HEAD request.
    pub fn head(
        &self,
        path: impl AsRef<str>,
        payload: impl Into<Payload>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        self.dispatch(Method::HEAD.as_str(), path, payload, customizers)
    }

    /// Builds a request, hands it to the handler, and records the response.
    ///
    /// A malformed method or path, a payload that fails to encode, or a
    /// customizer that fails aborts the test.
    pub fn dispatch(
        &self,
        method: impl AsRef<str>,
        path: impl AsRef<str>,
        payload: impl Into<Payload>,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> TestResponse {
        let request = self
            .build_request(method.as_ref(), path.as_ref(), payload.into(), customizers)
            .or_fatal(self.reporter.as_ref());

        tracing::debug!(
            http.method = %request.method(),
            http.path = %request.uri(),
            body_len = request.body().len(),
            "dispatching request"
        );
        let response = self.handler.handle(&request);
        tracing::debug!(http.status_code = response.status().as_u16(), "handler returned");

        TestResponse::from_http(Arc::clone(&self.reporter), Arc::new(request), response)
    }

    fn build_request(
        &self,
        method: &str,
        path: &str,
        payload: Payload,
        customizers: impl IntoIterator<Item = Customizer>,
    ) -> ReqrResult<Request<Body>> {
        let method = Method::from_bytes(method.as_bytes()).map_err(|e| ReqrError::InvalidMethod {
            method: method.to_string(),
            reason: e.to_string(),
        })?;
        let uri = parse_path(path)?;
        let body = payload.encode()?;

        let mut request = Request::builder().method(method).uri(uri).body(body)?;
        for (name, value) in &self.default_headers {
            request.headers_mut().insert(name, value.clone());
        }
        for customizer in customizers {
            customizer.apply(&mut request)?;
        }
        if let Some(host) = &self.default_host {
            request.headers_mut().entry(HOST).or_insert_with(|| host.clone());
        }
        Ok(request)
    }
}

/// Parses a request target.
///
/// Absolute paths, `*` and full URLs parse as usual. Anything else is a
/// relative path and stays a path, never an authority.
fn parse_path(path: &str) -> ReqrResult<Uri> {
    let invalid = |reason: String| ReqrError::InvalidUri {
        path: path.to_string(),
        reason,
    };
    if path.starts_with('/') || path.starts_with('*') || path.contains("://") {
        return path
            .parse()
            .map_err(|e: http::uri::InvalidUri| invalid(e.to_string()));
    }
    Uri::builder()
        .path_and_query(path)
        .build()
        .map_err(|e| invalid(e.to_string()))
}

impl fmt::Debug for Reqr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reqr")
            .field("default_headers", &self.default_headers)
            .field("default_host", &self.default_host)
            .finish_non_exhaustive()
    }
}
