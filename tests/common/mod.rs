//! Shared helpers for integration tests.

use arclight::app;
use arclight::module::{ModuleConfig, ModuleContract};
use arclight::modules::http::config::HttpServerConfig;
use arclight::modules::http::server::HttpServer;
use arclight::modules::tracing::{ExportedSpan, Resource, Tracer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

/// Service identity used by every test server.
pub const SERVICE_NAME: &str = "arclight-integration-test";
pub const SERVICE_VERSION: &str = "999-SNAPSHOT";

/// A running server plus handles for assertions.
pub struct TestServer {
    server: HttpServer,
    pub addr: SocketAddr,
    pub tracer: Arc<Tracer>,
}

impl TestServer {
    /// The server's authority string (`host:port`).
    pub fn authority(&self) -> String {
        self.addr.to_string()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.server.stop();
    }
}

/// Start a server on an OS-assigned port with the sample routes.
pub async fn spawn_server() -> TestServer {
    let tracer = Arc::new(Tracer::new(
        Resource::new(SERVICE_NAME, SERVICE_VERSION),
        4096,
    ));
    let routes = app::routes().expect("sample routes build");
    let config = HttpServerConfig {
        port: 0,
        ..Default::default()
    };

    let mut server = HttpServer::new(config, routes, Arc::clone(&tracer));
    server.init(ModuleConfig::new()).expect("server init");
    server.start().expect("server start");
    let addr = server.local_addr().expect("bound address");

    TestServer {
        server,
        addr,
        tracer,
    }
}

/// A parsed test-client reply.
#[derive(Debug)]
pub struct HttpReply {
    pub status: u16,
    pub status_line: String,
    pub body: String,
}

/// Plain GET over a fresh connection. This client is deliberately untraced;
/// it plays the external observer.
pub async fn get(addr: SocketAddr, path: &str) -> HttpReply {
    get_with_headers(addr, path, &[]).await
}

/// GET with extra headers (e.g. an injected trace carrier).
pub async fn get_with_headers(
    addr: SocketAddr,
    path: &str,
    headers: &[(&str, String)],
) -> HttpReply {
    let mut request = format!(
        "GET {path} HTTP/1.1\r\nhost: {addr}\r\nuser-agent: arclight-tests/1.0\r\naccept: */*\r\nconnection: close\r\n"
    );
    for (name, value) in headers {
        request.push_str(&format!("{name}: {value}\r\n"));
    }
    request.push_str("\r\n");

    let raw = raw_request(addr, &request).await;
    parse_reply(&raw)
}

/// GET with a specific Accept header.
pub async fn get_accepting(addr: SocketAddr, path: &str, accept: &str) -> HttpReply {
    let request = format!(
        "GET {path} HTTP/1.1\r\nhost: {addr}\r\nuser-agent: arclight-tests/1.0\r\naccept: {accept}\r\nconnection: close\r\n\r\n"
    );
    let raw = raw_request(addr, &request).await;
    parse_reply(&raw)
}

/// Write raw bytes, read until the peer closes, return everything as text.
pub async fn raw_request(addr: SocketAddr, request: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");

    let mut data = Vec::new();
    stream.read_to_end(&mut data).await.expect("read reply");
    String::from_utf8_lossy(&data).to_string()
}

fn parse_reply(raw: &str) -> HttpReply {
    let status_line = raw.lines().next().unwrap_or_default().to_string();
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let body = raw
        .split_once("\r\n\r\n")
        .map(|(_, body)| body.to_string())
        .unwrap_or_default();

    HttpReply {
        status,
        status_line,
        body,
    }
}

/// Fetch the export buffer through the HTTP endpoint.
pub async fn get_spans(addr: SocketAddr) -> Vec<ExportedSpan> {
    let reply = get(addr, "/export").await;
    assert_eq!(reply.status, 200, "export endpoint failed: {}", reply.body);
    serde_json::from_str(&reply.body).expect("export JSON")
}

/// Poll the export endpoint until it holds exactly `count` spans.
pub async fn await_span_count(addr: SocketAddr, count: usize) -> Vec<ExportedSpan> {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let spans = get_spans(addr).await;
        if spans.len() == count {
            return spans;
        }
        assert!(
            Instant::now() < deadline,
            "expected {count} spans, still have {} after 5s: {:?}",
            spans.len(),
            spans.iter().map(|s| s.name.clone()).collect::<Vec<_>>()
        );
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}

/// Reset the export buffer and wait for it to drain.
pub async fn reset(addr: SocketAddr) {
    let reply = get(addr, "/reset").await;
    assert_eq!(reply.status, 200);
    await_span_count(addr, 0).await;
}

/// The single span with the given kind and parent span id.
pub fn span_by_kind_and_parent<'a>(
    spans: &'a [ExportedSpan],
    kind: &str,
    parent_span_id: &str,
) -> &'a ExportedSpan {
    let matches: Vec<&ExportedSpan> = spans
        .iter()
        .filter(|s| s.kind == kind && s.parent_span_id == parent_span_id)
        .collect();
    assert_eq!(
        matches.len(),
        1,
        "expected exactly one {kind} span under {parent_span_id}, found {}",
        matches.len()
    );
    matches[0]
}

/// Assert the standard resource identity on an exported span.
pub fn verify_resource(span: &ExportedSpan) {
    assert_eq!(span.get("resource_service.name"), Some(SERVICE_NAME));
    assert_eq!(span.get("resource_service.version"), Some(SERVICE_VERSION));
    assert_eq!(span.get("resource_telemetry.sdk.language"), Some("rust"));
    assert_eq!(span.get("resource_telemetry.sdk.name"), Some("arclight"));
    assert!(span.get("resource_telemetry.sdk.version").is_some());
}

/// The all-zero span id sentinel in hex.
pub fn invalid_span_id() -> String {
    "0".repeat(16)
}

/// The all-zero trace id sentinel in hex.
pub fn invalid_trace_id() -> String {
    "0".repeat(32)
}
