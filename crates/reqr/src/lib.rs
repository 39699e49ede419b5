//! # reqr
//!
//! Fluent, in-process assertions for HTTP handlers.
//!
//! A [`Reqr`] hands synthetic requests straight to the handler under test,
//! records the response, and returns a [`TestResponse`] whose accessors each
//! produce an [`Expectation`]. Nothing binds a port or touches the network.
//!
//! ## Key Features
//!
//! - **Any body**: text, bytes, readers, or serializable values as JSON
//! - **Transform chains**: reshape a body through [`Step`]s before checking it
//! - **Soft and hard failures**: mismatches are collected, misuse aborts
//! - **Request introspection**: assert on what the handler actually received
//!
//! ## Example
//!
//! ```ignore
//! use reqr::{steps, Body, Reqr, TestReporter};
//! use http::{Request, Response};
//! use serde_json::json;
//!
//! #[test]
//! fn test_ping() {
//!     let reporter = TestReporter::new("test_ping");
//!     let reqr = Reqr::new(
//!         |_: &Request<Body>| Response::new(Body::from("pong")),
//!         reporter.clone(),
//!     );
//!
//!     let response = reqr.get("/ping", []);
//!     response.status().equals(200);
//!     response.body().contains("^po");
//! }
//!
//! #[test]
//! fn test_create_user() {
//!     let reporter = TestReporter::new("test_create_user");
//!     let reqr = Reqr::new(app, reporter.clone());
//!
//!     reqr.post("/users", json!({"name": "Alice"}), [])
//!         .body_with([steps::json_value(), steps::json_field("name")])
//!         .equals(json!("Alice"));
//! }
//! ```
//!
//! Soft failures are kept by the [`TestReporter`] and fail the test when it is
//! dropped; fatal faults panic immediately.

#![doc(html_root_url = "https://docs.rs/reqr/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod body;
mod client;
pub mod config;
pub mod customize;
mod error;
mod expectation;
pub mod handlers;
pub mod logging;
mod reporter;
mod request;
mod response;
pub mod steps;
pub mod transform;

pub use body::{Body, BodyReader, Payload};
pub use client::{Handler, Reqr};
pub use config::{ConfigLoader, ReqrConfig};
pub use customize::Customizer;
pub use error::{ReqrError, ReqrResult};
pub use expectation::{Captured, Expectation};
pub use logging::LogConfig;
pub use reporter::{OrFatal, Reporter, ReporterHandle, TestReporter};
pub use request::TestRequest;
pub use response::TestResponse;
pub use transform::{Step, StepOutput};
