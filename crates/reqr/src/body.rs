//! Request/response bodies and the payload encoder.

use crate::error::{ReqrError, ReqrResult};
use bytes::buf::Reader;
use bytes::{Buf, Bytes};
use serde::Serialize;
use std::fmt;
use std::io::{self, Read};

/// An HTTP body that remembers whether it was ever supplied.
///
/// An absent body ("no body") and a present zero-length body are distinct
/// values, mirroring a request built without a body versus one built with
/// `""`.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Body(Option<Bytes>);

impl Body {
    /// A body that was never supplied.
    #[must_use]
    pub const fn absent() -> Self {
        Self(None)
    }

    /// A present, zero-length body.
    #[must_use]
    pub fn empty() -> Self {
        Self(Some(Bytes::new()))
    }

    /// Returns true if no body was supplied.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the body length; zero when absent.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.as_ref().map_or(0, Bytes::len)
    }

    /// Returns true if the body is absent or zero-length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the body bytes; empty when absent.
    #[must_use]
    pub fn bytes(&self) -> Bytes {
        self.0.clone().unwrap_or_default()
    }

    /// Returns the body as text.
    ///
    /// Invalid UTF-8 is replaced with `U+FFFD` without any error; read the
    /// body with [`steps::read_text`](crate::steps::read_text) to have it
    /// reported instead.
    #[must_use]
    pub fn text(&self) -> String {
        self.0
            .as_ref()
            .map(|b| String::from_utf8_lossy(b).into_owned())
            .unwrap_or_default()
    }

    /// Opens a fresh reader over the body.
    #[must_use]
    pub fn reader(&self) -> BodyReader {
        BodyReader {
            inner: self.bytes().reader(),
            absent: self.is_absent(),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            None => f.write_str("Body(<absent>)"),
            Some(b) => write!(f, "Body({b:?})"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self(Some(bytes))
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Some(Bytes::from(bytes)))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self(Some(Bytes::from(text)))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self(Some(Bytes::from_static(text.as_bytes())))
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Self(Some(Bytes::from_static(bytes)))
    }
}

/// A reader over a body snapshot.
///
/// This is the input every transform chain starts from.
pub struct BodyReader {
    inner: Reader<Bytes>,
    absent: bool,
}

impl BodyReader {
    /// Returns true if the underlying body was never supplied.
    #[must_use]
    pub fn is_absent(&self) -> bool {
        self.absent
    }

    /// Returns the bytes not yet read.
    #[must_use]
    pub fn into_bytes(self) -> Bytes {
        self.inner.into_inner()
    }
}

impl Read for BodyReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl fmt::Debug for BodyReader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyReader")
            .field("remaining", &self.inner.get_ref().remaining())
            .field("absent", &self.absent)
            .finish()
    }
}

/// Anything that can be sent as a request body.
///
/// Text and bytes are used verbatim, readers are drained, and structured
/// values are encoded as JSON followed by a newline.
pub enum Payload {
    /// No body at all.
    Absent,
    /// Raw text, sent verbatim.
    Text(String),
    /// Raw bytes, sent verbatim.
    Bytes(Bytes),
    /// A byte stream, drained into the body.
    Stream(Box<dyn Read + Send>),
    /// A structured value, encoded as JSON.
    Structured(Box<dyn FnOnce(&mut Vec<u8>) -> serde_json::Result<()> + Send>),
}

impl Payload {
    /// Wraps any serializable value.
    ///
    /// # Example
    ///
    /// ```ignore
    /// reqr.post("/users", Payload::json(User { name: "Alice".into() }), []);
    /// ```
    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Self::Structured(Box::new(move |buf| serde_json::to_writer(buf, &value)))
    }

    /// Wraps a byte stream.
    pub fn reader<R>(reader: R) -> Self
    where
        R: Read + Send + 'static,
    {
        Self::Stream(Box::new(reader))
    }

    /// Encodes the payload into a body.
    pub fn encode(self) -> ReqrResult<Body> {
        match self {
            Self::Absent => Ok(Body::absent()),
            Self::Text(text) => Ok(Body::from(text)),
            Self::Bytes(bytes) => Ok(Body::from(bytes)),
            Self::Stream(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(Body::from(buf))
            }
            Self::Structured(encode) => {
                let mut buf = Vec::new();
                encode(&mut buf).map_err(ReqrError::Encode)?;
                buf.push(b'\n');
                Ok(Body::from(buf))
            }
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(bytes).finish(),
            Self::Stream(_) => f.write_str("Stream(..)"),
            Self::Structured(_) => f.write_str("Structured(..)"),
        }
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        Self::json(value)
    }
}

impl<T: Into<Payload>> From<Option<T>> for Payload {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Absent, Into::into)
    }
}
