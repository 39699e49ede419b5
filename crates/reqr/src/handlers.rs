//! Ready-made handlers for exercising the harness itself.

use crate::body::Body;
use crate::client::Handler;
use http::header::CONTENT_TYPE;
use http::{Request, Response, StatusCode};

/// A handler that echoes the request back.
///
/// The response carries the request body, its Content-Type, and the method
/// and path in `X-Echo-Method` / `X-Echo-Path`.
pub fn echo() -> impl Handler {
    |request: &Request<Body>| {
        let mut response = Response::new(request.body().clone());
        let headers = response.headers_mut();
        if let Some(content_type) = request.headers().get(CONTENT_TYPE) {
            headers.insert(CONTENT_TYPE, content_type.clone());
        }
        if let Ok(method) = request.method().as_str().parse() {
            headers.insert("x-echo-method", method);
        }
        if let Ok(path) = request.uri().path().parse() {
            headers.insert("x-echo-path", path);
        }
        response
    }
}

/// A handler that always returns the same status and body.
pub fn fixed(status: StatusCode, body: impl Into<String>) -> impl Handler {
    let body = body.into();
    move |_: &Request<Body>| {
        let mut response = Response::new(Body::from(body.clone()));
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_echo() {
        let request = Request::builder()
            .method("PUT")
            .uri("/items/1")
            .header("Content-Type", "text/plain")
            .body(Body::from("hello"))
            .unwrap();

        let response = echo().handle(&request);
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body().text(), "hello");
        assert_eq!(response.headers()["x-echo-method"], "PUT");
        assert_eq!(response.headers()["x-echo-path"], "/items/1");
        assert_eq!(response.headers()["content-type"], "text/plain");
    }

    #[test]
    fn test_echo_keeps_absent_body() {
        let request = Request::builder().body(Body::absent()).unwrap();
        assert!(echo().handle(&request).body().is_absent());
    }

    #[test]
    fn test_fixed() {
        let handler = fixed(StatusCode::CREATED, "created");
        let request = Request::builder().body(Body::absent()).unwrap();
        let response = handler.handle(&request);
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.body().text(), "created");
    }
}
