//! Traced HTTP client for outbound calls.
//!
//! A deliberately small HTTP/1.1 client: one connection per call,
//! `connection: close`, body framed by content-length. Every call runs
//! under a Client span whose context is injected into the outbound
//! headers.

use super::error::{HttpError, HttpResult};
use super::request::Request;
use super::response::Response;
use crate::modules::tracing::{SpanContext, Tracer};
use bytes::Bytes;
use http::Method;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// Overall deadline for a single outbound call.
const CALL_TIMEOUT: Duration = Duration::from_secs(10);

/// Split an `http://authority/path` URL into authority and path.
fn split_url(url: &str) -> HttpResult<(String, String)> {
    let rest = url
        .strip_prefix("http://")
        .ok_or_else(|| HttpError::InvalidUrl(format!("expected http:// URL, got '{url}'")))?;

    if rest.is_empty() {
        return Err(HttpError::InvalidUrl(format!("missing authority in '{url}'")));
    }

    match rest.find('/') {
        Some(idx) => Ok((rest[..idx].to_string(), rest[idx..].to_string())),
        None => Ok((rest.to_string(), String::new())),
    }
}

/// Traced HTTP client.
#[derive(Clone)]
pub struct HttpClient {
    tracer: Arc<Tracer>,
}

impl HttpClient {
    /// Create a client sharing the process tracer.
    pub fn new(tracer: Arc<Tracer>) -> Self {
        Self { tracer }
    }

    /// Issue a GET request under a Client span parented to `parent`.
    ///
    /// The span is named `HTTP GET` and records `http.method`, `http.url`,
    /// and `http.status_code`; the trace context travels in the injected
    /// carrier headers.
    pub async fn get(&self, url: &str, parent: &SpanContext) -> HttpResult<Response> {
        let (mut span, carrier) = self.tracer.client_span("HTTP GET", parent);
        span.set_attribute("http.method", "GET");
        span.set_attribute("http.url", url);

        let result = tokio::time::timeout(CALL_TIMEOUT, self.send(url, &carrier))
            .await
            .map_err(|_| HttpError::Timeout(format!("GET {url}")))
            .and_then(|r| r);

        match &result {
            Ok(response) => {
                span.set_attribute("http.status_code", response.status().as_u16().to_string());
            },
            Err(e) => {
                span.set_attribute("error", e.to_string());
            },
        }
        self.tracer.finish(span);

        result
    }

    async fn send(&self, url: &str, carrier: &HashMap<String, String>) -> HttpResult<Response> {
        let (authority, path) = split_url(url)?;
        let target = if path.is_empty() { "/" } else { path.as_str() };

        let mut builder = Request::builder()
            .method(Method::GET)
            .uri(target)?
            .header("host", &authority)
            .header("user-agent", concat!("arclight/", env!("CARGO_PKG_VERSION")))
            .header("accept", "*/*")
            .header("connection", "close");
        for (name, value) in carrier {
            builder = builder.header(name, value.clone());
        }
        let request = builder.build();

        debug!(url = %url, "outbound request");

        let mut stream = TcpStream::connect(&authority).await?;
        stream.write_all(&request.serialize()).await?;

        let mut data = Vec::new();
        stream.read_to_end(&mut data).await?;
        if data.is_empty() {
            return Err(HttpError::ConnectionClosed);
        }

        let (mut response, body_offset) = Response::parse(&data)?;
        if body_offset < data.len() {
            response.set_body(Bytes::copy_from_slice(&data[body_offset..]));
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_url_with_path() {
        let (authority, path) = split_url("http://localhost:8081/client/pong/one").unwrap();
        assert_eq!(authority, "localhost:8081");
        assert_eq!(path, "/client/pong/one");
    }

    #[test]
    fn test_split_url_without_path() {
        let (authority, path) = split_url("http://localhost:8081").unwrap();
        assert_eq!(authority, "localhost:8081");
        assert_eq!(path, "");
    }

    #[test]
    fn test_split_url_root_path() {
        let (authority, path) = split_url("http://localhost:8081/").unwrap();
        assert_eq!(authority, "localhost:8081");
        assert_eq!(path, "/");
    }

    #[test]
    fn test_split_url_rejects_non_http() {
        assert!(split_url("https://localhost/").is_err());
        assert!(split_url("localhost/").is_err());
        assert!(split_url("http://").is_err());
    }
}
