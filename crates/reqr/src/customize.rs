//! Request customizers, applied in order before dispatch.

use crate::body::Body;
use crate::error::{ReqrError, ReqrResult};
use http::header::{AUTHORIZATION, CONTENT_TYPE, HOST};
use http::{HeaderName, HeaderValue, Request};
use std::fmt;

type CustomizeFn = Box<dyn FnOnce(&mut Request<Body>) -> ReqrResult<()>>;

/// A change made to a request before it is handed to the handler.
///
/// ```ignore
/// reqr.get("/users", [
///     customize::bearer_token("secret"),
///     Customizer::new(|req| *req.uri_mut() = "/users?page=2".parse().unwrap()),
/// ]);
/// ```
pub struct Customizer(CustomizeFn);

impl Customizer {
    /// Wraps an arbitrary request mutation.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(&mut Request<Body>) + 'static,
    {
        Self(Box::new(move |request| {
            f(request);
            Ok(())
        }))
    }

    fn fallible<F>(f: F) -> Self
    where
        F: FnOnce(&mut Request<Body>) -> ReqrResult<()> + 'static,
    {
        Self(Box::new(f))
    }

    pub(crate) fn apply(self, request: &mut Request<Body>) -> ReqrResult<()> {
        (self.0)(request)
    }
}

impl fmt::Debug for Customizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Customizer(..)")
    }
}

/// Sets a header, replacing any earlier value.
pub fn header(name: impl AsRef<str>, value: impl AsRef<str>) -> Customizer {
    let name = name.as_ref().to_string();
    let value = value.as_ref().to_string();
    Customizer::fallible(move |request| {
        let (name, value) = parse_header(&name, &value)?;
        request.headers_mut().insert(name, value);
        Ok(())
    })
}

/// Appends a header value, keeping earlier values.
pub fn append_header(name: impl AsRef<str>, value: impl AsRef<str>) -> Customizer {
    let name = name.as_ref().to_string();
    let value = value.as_ref().to_string();
    Customizer::fallible(move |request| {
        let (name, value) = parse_header(&name, &value)?;
        request.headers_mut().append(name, value);
        Ok(())
    })
}

/// Sets the Content-Type header.
pub fn content_type(content_type: impl AsRef<str>) -> Customizer {
    header(CONTENT_TYPE.as_str(), content_type)
}

/// Sets the Authorization header with a Bearer token.
pub fn bearer_token(token: impl AsRef<str>) -> Customizer {
    header(AUTHORIZATION.as_str(), format!("Bearer {}", token.as_ref()))
}

/// Sets the Host header.
pub fn host(host: impl AsRef<str>) -> Customizer {
    header(HOST.as_str(), host)
}

pub(crate) fn parse_header(name: &str, value: &str) -> ReqrResult<(HeaderName, HeaderValue)> {
    let header_name =
        HeaderName::try_from(name).map_err(|e| ReqrError::invalid_header(name, e))?;
    let header_value =
        HeaderValue::try_from(value).map_err(|e| ReqrError::invalid_header(name, e))?;
    Ok((header_name, header_value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request<Body> {
        Request::builder().uri("/users").body(Body::absent()).unwrap()
    }

    #[test]
    fn test_header() {
        let mut req = request();
        header("X-Test", "value").apply(&mut req).unwrap();
        header("X-Test", "replaced").apply(&mut req).unwrap();
        assert_eq!(req.headers().get("X-Test").unwrap(), "replaced");
    }

    #[test]
    fn test_append_header() {
        let mut req = request();
        append_header("Accept", "text/plain").apply(&mut req).unwrap();
        append_header("Accept", "application/json").apply(&mut req).unwrap();
        assert_eq!(req.headers().get_all("Accept").iter().count(), 2);
    }

    #[test]
    fn test_bearer_token() {
        let mut req = request();
        bearer_token("my_token").apply(&mut req).unwrap();
        assert_eq!(req.headers().get("Authorization").unwrap(), "Bearer my_token");
    }

    #[test]
    fn test_content_type_and_host() {
        let mut req = request();
        content_type("text/plain").apply(&mut req).unwrap();
        host("api.test").apply(&mut req).unwrap();
        assert_eq!(req.headers().get("Content-Type").unwrap(), "text/plain");
        assert_eq!(req.headers().get("Host").unwrap(), "api.test");
    }

    #[test]
    fn test_invalid_header_name() {
        let mut req = request();
        let err = header("X Bad", "v").apply(&mut req).unwrap_err();
        assert!(matches!(err, ReqrError::InvalidHeader { .. }));
    }

    #[test]
    fn test_closure() {
        let mut req = request();
        Customizer::new(|r| *r.method_mut() = http::Method::PATCH)
            .apply(&mut req)
            .unwrap();
        assert_eq!(req.method(), http::Method::PATCH);
    }
}
