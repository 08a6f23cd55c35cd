//! HTTP response building and serialization.

use super::error::{HttpError, HttpResult};
use super::headers::HeaderMap;
use bytes::{Bytes, BytesMut};
use http::{StatusCode, Version};
use std::fmt::Write as _;

/// An HTTP response.
///
/// Always serialized with a `content-length`, including zero-length bodies,
/// so clients framing on the header never wait for a close.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// Start assembling a response.
    #[must_use]
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder::new()
    }

    /// Builder preset to the given status.
    #[must_use]
    pub fn with_status(status: StatusCode) -> ResponseBuilder {
        ResponseBuilder::new().status(status)
    }

    /// 200 OK.
    #[must_use]
    pub fn ok() -> ResponseBuilder {
        Self::with_status(StatusCode::OK)
    }

    /// 400 Bad Request.
    #[must_use]
    pub fn bad_request() -> ResponseBuilder {
        Self::with_status(StatusCode::BAD_REQUEST)
    }

    /// 404 Not Found.
    #[must_use]
    pub fn not_found() -> ResponseBuilder {
        Self::with_status(StatusCode::NOT_FOUND)
    }

    /// 406 Not Acceptable.
    #[must_use]
    pub fn not_acceptable() -> ResponseBuilder {
        Self::with_status(StatusCode::NOT_ACCEPTABLE)
    }

    /// 415 Unsupported Media Type.
    #[must_use]
    pub fn unsupported_media_type() -> ResponseBuilder {
        Self::with_status(StatusCode::UNSUPPORTED_MEDIA_TYPE)
    }

    /// 500 Internal Server Error.
    #[must_use]
    pub fn internal_error() -> ResponseBuilder {
        Self::with_status(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Raw 501 reply echoing the received protocol version token.
    ///
    /// Used by the version guard: the status line reflects the (possibly
    /// malformed) token as received, and the connection closes after the
    /// write.
    #[must_use]
    pub fn not_implemented_raw(version_token: &str) -> Bytes {
        Bytes::from(format!(
            "{version_token} 501 Not Implemented\r\ncontent-length: 0\r\nconnection: close\r\n\r\n"
        ))
    }

    /// Status code.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// HTTP version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// A header value, by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// The `Content-Type` header.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type")
    }

    /// The `Content-Length` header, parsed.
    #[must_use]
    pub fn content_length(&self) -> Option<usize> {
        self.headers.get("content-length").and_then(|s| s.parse().ok())
    }

    /// Response body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Attach the response body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Insert or replace a header.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Serialize to wire bytes.
    #[must_use]
    pub fn serialize(&self) -> BytesMut {
        let version_token = match self.version {
            Version::HTTP_10 => "HTTP/1.0",
            _ => "HTTP/1.1",
        };

        let mut head = format!(
            "{} {} {}\r\n",
            version_token,
            self.status.as_u16(),
            self.status.canonical_reason().unwrap_or("")
        );
        for (name, value) in self.headers.iter() {
            let _ = write!(head, "{name}: {value}\r\n");
        }
        if !self.headers.contains("content-length") {
            let _ = write!(head, "content-length: {}\r\n", self.body.len());
        }
        head.push_str("\r\n");

        let mut wire = BytesMut::with_capacity(head.len() + self.body.len());
        wire.extend_from_slice(head.as_bytes());
        wire.extend_from_slice(&self.body);
        wire
    }

    /// Parse a response head from bytes, returning it with the body offset.
    pub fn parse(data: &[u8]) -> HttpResult<(Self, usize)> {
        let mut slots = [httparse::EMPTY_HEADER; 100];
        let mut head = httparse::Response::new(&mut slots);

        let body_offset = match head.parse(data)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => {
                return Err(HttpError::Parse("incomplete response".to_string()))
            },
        };

        let status = head
            .code
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK);
        let version = if head.version == Some(0) {
            Version::HTTP_10
        } else {
            Version::HTTP_11
        };

        let response = Self {
            status,
            version,
            headers: HeaderMap::from_httparse(head.headers),
            body: Bytes::new(),
        };
        Ok((response, body_offset))
    }
}

/// Builder for [`Response`]s.
#[derive(Debug, Default)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl ResponseBuilder {
    /// Create a builder for a 200 OK.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the status code.
    #[must_use]
    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Set the `Content-Type` header.
    #[must_use]
    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.header("content-type", content_type)
    }

    /// Set the body bytes.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Plain-text body with the matching content type.
    #[must_use]
    pub fn text(self, text: impl Into<String>) -> Self {
        self.content_type("text/plain; charset=utf-8")
            .body(Bytes::from(text.into()))
    }

    /// JSON body with the matching content type.
    #[must_use]
    pub fn json(self, json: impl Into<String>) -> Self {
        self.content_type("application/json")
            .body(Bytes::from(json.into()))
    }

    /// Finish the response.
    #[must_use]
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            version: Version::HTTP_11,
            headers: self.headers,
            body: self.body,
        }
    }
}
