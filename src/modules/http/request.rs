//! HTTP request parsing.

use super::error::{HttpError, HttpResult};
use super::headers::HeaderMap;
use bytes::{Bytes, BytesMut};
use http::{Method, Uri, Version};
use std::fmt::Write as _;
use std::str::FromStr;

/// Header slots handed to httparse.
const MAX_HEADERS: usize = 100;

/// Protocol versions this server speaks.
const SUPPORTED_VERSIONS: [&str; 2] = ["HTTP/1.0", "HTTP/1.1"];

/// Scan the raw request line and verify the protocol version token.
///
/// Runs before full parsing so that an unrecognized version (for example
/// `HTTP/50.0`) is reported as [`HttpError::UnsupportedVersion`] carrying
/// the token verbatim, letting the connection handler echo it in a 501
/// status line instead of failing the parse.
pub fn scan_version(data: &[u8]) -> HttpResult<()> {
    let line_end = data
        .windows(2)
        .position(|w| w == b"\r\n")
        .ok_or_else(|| HttpError::Parse("incomplete request line".to_string()))?;

    let line = String::from_utf8_lossy(&data[..line_end]);
    let mut tokens = line.split_whitespace();
    let _method = tokens
        .next()
        .ok_or_else(|| HttpError::Parse("empty request line".to_string()))?;
    let _target = tokens
        .next()
        .ok_or_else(|| HttpError::Parse("request line missing target".to_string()))?;
    let version = tokens
        .next()
        .ok_or_else(|| HttpError::Parse("request line missing version".to_string()))?;

    if SUPPORTED_VERSIONS.contains(&version) {
        Ok(())
    } else {
        Err(HttpError::UnsupportedVersion {
            token: version.to_string(),
        })
    }
}

/// An inbound HTTP request.
///
/// Produced by [`Request::parse`] on the server side or assembled with the
/// builder for outbound calls.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    peer_addr: Option<String>,
}

impl Request {
    /// Start assembling a request.
    #[must_use]
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Parse a request head from bytes.
    ///
    /// Returns the request plus the offset where the body begins. The
    /// version token must have been vetted with [`scan_version`] first;
    /// anything httparse cannot digest surfaces as a parse error.
    pub fn parse(data: &[u8]) -> HttpResult<(Self, usize)> {
        let mut slots = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut head = httparse::Request::new(&mut slots);

        let body_offset = match head.parse(data)? {
            httparse::Status::Complete(offset) => offset,
            httparse::Status::Partial => {
                return Err(HttpError::Parse("incomplete request".to_string()))
            },
        };

        let method = Method::from_str(head.method.unwrap_or("GET"))
            .map_err(|e| HttpError::InvalidMethod(e.to_string()))?;
        let uri = Uri::from_str(head.path.unwrap_or("/"))
            .map_err(|e| HttpError::InvalidUri(e.to_string()))?;
        let version = if head.version == Some(0) {
            Version::HTTP_10
        } else {
            Version::HTTP_11
        };

        let request = Self {
            method,
            uri,
            version,
            headers: HeaderMap::from_httparse(head.headers),
            body: Bytes::new(),
            peer_addr: None,
        };
        Ok((request, body_offset))
    }

    /// HTTP method.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI.
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Path component of the URI.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    /// Query string, if any.
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Path plus query string, as sent on the request line.
    #[must_use]
    pub fn target(&self) -> String {
        match self.uri.query() {
            Some(query) => format!("{}?{}", self.uri.path(), query),
            None => self.uri.path().to_string(),
        }
    }

    /// HTTP version.
    #[must_use]
    pub fn version(&self) -> Version {
        self.version
    }

    /// Protocol version in `major.minor` form, e.g. `1.1`.
    #[must_use]
    pub fn flavor(&self) -> &'static str {
        match self.version {
            Version::HTTP_10 => "1.0",
            _ => "1.1",
        }
    }

    /// A header value, by case-insensitive name.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// All request headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The `Host` header.
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.headers.get("host")
    }

    /// The `Accept` header.
    #[must_use]
    pub fn accept(&self) -> Option<&str> {
        self.headers.get("accept")
    }

    /// The `User-Agent` header.
    #[must_use]
    pub fn user_agent(&self) -> Option<&str> {
        self.headers.get("user-agent")
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

    /// Request body.
    #[must_use]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Address of the connected peer, when known.
    #[must_use]
    pub fn peer_addr(&self) -> Option<&str> {
        self.peer_addr.as_deref()
    }

    /// Record the connected peer's address.
    pub fn set_peer_addr(&mut self, addr: impl Into<String>) {
        self.peer_addr = Some(addr.into());
    }

    /// Attach the request body.
    pub fn set_body(&mut self, body: impl Into<Bytes>) {
        self.body = body.into();
    }

    /// Insert or replace a header.
    pub fn set_header(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    /// Whether the connection may be reused after this request.
    ///
    /// HTTP/1.1 defaults to keep-alive unless the peer asked to close;
    /// HTTP/1.0 is the other way around.
    #[must_use]
    pub fn is_keep_alive(&self) -> bool {
        let connection = self.headers.get("connection");
        match self.version {
            Version::HTTP_11 => !connection
                .map(|v| v.eq_ignore_ascii_case("close"))
                .unwrap_or(false),
            Version::HTTP_10 => connection
                .map(|v| v.eq_ignore_ascii_case("keep-alive"))
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Serialize the request head and body to wire bytes.
    #[must_use]
    pub fn serialize(&self) -> BytesMut {
        let version_token = match self.version {
            Version::HTTP_10 => "HTTP/1.0",
            _ => "HTTP/1.1",
        };

        let mut head = format!("{} {} {}\r\n", self.method, self.target(), version_token);
        for (name, value) in self.headers.iter() {
            let _ = write!(head, "{name}: {value}\r\n");
        }
        if !self.body.is_empty() && !self.headers.contains("content-length") {
            let _ = write!(head, "content-length: {}\r\n", self.body.len());
        }
        head.push_str("\r\n");

        let mut wire = BytesMut::with_capacity(head.len() + self.body.len());
        wire.extend_from_slice(head.as_bytes());
        wire.extend_from_slice(&self.body);
        wire
    }
}

/// Builder for outbound [`Request`]s.
#[derive(Debug)]
pub struct RequestBuilder {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
}

impl RequestBuilder {
    /// Create a builder for a `GET /`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            method: Method::GET,
            uri: Uri::from_static("/"),
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Set the HTTP method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Set the request URI.
    pub fn uri(mut self, uri: impl AsRef<str>) -> HttpResult<Self> {
        self.uri = Uri::from_str(uri.as_ref())?;
        Ok(self)
    }

    /// Add a header.
    #[must_use]
    pub fn header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Set the request body.
    #[must_use]
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Finish the request.
    #[must_use]
    pub fn build(self) -> Request {
        Request {
            method: self.method,
            uri: self.uri,
            version: self.version,
            headers: self.headers,
            body: self.body,
            peer_addr: None,
        }
    }
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}
