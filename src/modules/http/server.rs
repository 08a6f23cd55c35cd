//! HTTP server module: connection handling and traced dispatch.

use super::client::HttpClient;
use super::config::HttpServerConfig;
use super::context::RequestContext;
use super::error::{HttpError, HttpResult};
use super::request::{self, Request};
use super::response::Response;
use crate::module::{
    Capability, MetricsPayload, ModuleConfig, ModuleContract, ModuleError, ModuleManifest,
    ModuleResult, ModuleStatus,
};
use crate::modules::router::error::ResolveError;
use crate::modules::router::table::{RouteMatch, RouteTable};
use crate::modules::tracing::{TraceHandle, Tracer};
use bytes::{Bytes, BytesMut};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Statistics for the HTTP server.
#[derive(Debug, Default)]
pub struct HttpStats {
    /// Total requests received.
    pub requests_total: AtomicU64,
    /// Successful responses (2xx).
    pub responses_2xx: AtomicU64,
    /// Client errors (4xx).
    pub responses_4xx: AtomicU64,
    /// Server errors (5xx).
    pub responses_5xx: AtomicU64,
    /// Active connections.
    pub active_connections: AtomicU64,
}

impl HttpStats {
    /// Create new stats.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a request.
    pub fn record_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a response by status code.
    pub fn record_response(&self, status: u16) {
        match status {
            200..=299 => self.responses_2xx.fetch_add(1, Ordering::Relaxed),
            400..=499 => self.responses_4xx.fetch_add(1, Ordering::Relaxed),
            500..=599 => self.responses_5xx.fetch_add(1, Ordering::Relaxed),
            _ => 0,
        };
    }

    /// Increment active connections.
    pub fn connection_opened(&self) {
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Decrement active connections.
    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }
}

/// Shared state handed to every connection task.
struct ServerState {
    config: HttpServerConfig,
    routes: Arc<RouteTable>,
    tracer: Arc<Tracer>,
    client: HttpClient,
    stats: Arc<HttpStats>,
    local_authority: String,
}

/// HTTP server implementing the module contract.
///
/// The listener is bound during `init` (port 0 is honored, for tests), the
/// accept loop is spawned in `start`, and each connection runs on its own
/// tokio task. The route table and tracer are shared read-only.
pub struct HttpServer {
    /// Configuration.
    config: HttpServerConfig,
    /// Route table.
    routes: Arc<RouteTable>,
    /// Process tracer.
    tracer: Arc<Tracer>,
    /// Statistics.
    stats: Arc<HttpStats>,
    /// Current status.
    status: ModuleStatus,
    /// Bound listener, held between init and start.
    listener: Option<std::net::TcpListener>,
    /// Bound address.
    local_addr: Option<SocketAddr>,
    /// Accept loop handle.
    accept_handle: Option<tokio::task::JoinHandle<()>>,
    /// Shutdown signal.
    shutdown_tx: Option<watch::Sender<bool>>,
}

impl HttpServer {
    /// Create a server over the given route table and tracer.
    #[must_use]
    pub fn new(config: HttpServerConfig, routes: RouteTable, tracer: Arc<Tracer>) -> Self {
        Self {
            config,
            routes: Arc::new(routes),
            tracer,
            stats: Arc::new(HttpStats::new()),
            status: ModuleStatus::Stopped,
            listener: None,
            local_addr: None,
            accept_handle: None,
            shutdown_tx: None,
        }
    }

    /// The bound address, available after `init`.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Server statistics.
    #[must_use]
    pub fn stats(&self) -> &Arc<HttpStats> {
        &self.stats
    }
}

impl ModuleContract for HttpServer {
    fn manifest(&self) -> ModuleManifest {
        ModuleManifest::builder("http-server")
            .description("HTTP/1.1 server with traced route dispatch")
            .version(1, 0, 0)
            .capability(Capability::HttpProtocol)
            .capability(Capability::RouteResolution)
            .capability(Capability::SpanExport)
            .build()
    }

    fn init(&mut self, config: ModuleConfig) -> ModuleResult<()> {
        if self.status != ModuleStatus::Stopped {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "stopped".to_string(),
            });
        }

        if let Some(port) = config.get_integer("port") {
            self.config.port = u16::try_from(port)
                .map_err(|_| ModuleError::ConfigError(format!("port out of range: {port}")))?;
        }
        if let Some(addr) = config.get_string("bind_addr") {
            self.config.bind_addr = addr.to_string();
        }

        let listener =
            std::net::TcpListener::bind((self.config.bind_addr.as_str(), self.config.port))
                .map_err(|e| ModuleError::InitializationFailed(format!("bind failed: {e}")))?;
        listener
            .set_nonblocking(true)
            .map_err(|e| ModuleError::InitializationFailed(e.to_string()))?;

        self.local_addr = Some(
            listener
                .local_addr()
                .map_err(|e| ModuleError::InitializationFailed(e.to_string()))?,
        );
        self.listener = Some(listener);
        self.status = ModuleStatus::Initializing;
        Ok(())
    }

    fn start(&mut self) -> ModuleResult<()> {
        if self.status != ModuleStatus::Initializing {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "initializing".to_string(),
            });
        }

        let std_listener = self
            .listener
            .take()
            .ok_or_else(|| ModuleError::StartFailed("listener missing".to_string()))?;
        let listener = TcpListener::from_std(std_listener)
            .map_err(|e| ModuleError::StartFailed(e.to_string()))?;

        let local_authority = self
            .local_addr
            .map(|addr| addr.to_string())
            .unwrap_or_else(|| format!("{}:{}", self.config.bind_addr, self.config.port));

        let state = Arc::new(ServerState {
            config: self.config.clone(),
            routes: Arc::clone(&self.routes),
            tracer: Arc::clone(&self.tracer),
            client: HttpClient::new(Arc::clone(&self.tracer)),
            stats: Arc::clone(&self.stats),
            local_authority,
        });

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => {
                        info!("listener shutting down");
                        break;
                    },
                    accepted = listener.accept() => match accepted {
                        Ok((stream, peer)) => {
                            let state = Arc::clone(&state);
                            tokio::spawn(handle_connection(stream, peer, state));
                        },
                        Err(e) => {
                            warn!(error = %e, "accept failed");
                        },
                    },
                }
            }
        });

        info!(addr = %self.local_addr.map(|a| a.to_string()).unwrap_or_default(), "http server started");
        self.accept_handle = Some(handle);
        self.shutdown_tx = Some(shutdown_tx);
        self.status = ModuleStatus::Running;
        Ok(())
    }

    fn stop(&mut self) -> ModuleResult<()> {
        if self.status != ModuleStatus::Running {
            return Err(ModuleError::InvalidState {
                current: self.status.to_string(),
                expected: "running".to_string(),
            });
        }

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(true);
        }
        if let Some(handle) = self.accept_handle.take() {
            handle.abort();
        }

        self.status = ModuleStatus::Stopped;
        Ok(())
    }

    fn status(&self) -> ModuleStatus {
        self.status.clone()
    }

    fn metrics(&self) -> MetricsPayload {
        let mut payload = MetricsPayload::new();
        payload.counter(
            "requests_total",
            self.stats.requests_total.load(Ordering::Relaxed),
        );
        payload.counter(
            "responses_2xx",
            self.stats.responses_2xx.load(Ordering::Relaxed),
        );
        payload.counter(
            "responses_4xx",
            self.stats.responses_4xx.load(Ordering::Relaxed),
        );
        payload.counter(
            "responses_5xx",
            self.stats.responses_5xx.load(Ordering::Relaxed),
        );
        payload.gauge(
            "active_connections",
            self.stats.active_connections.load(Ordering::Relaxed) as f64,
        );
        payload.gauge("routes", self.routes.len() as f64);
        payload
    }
}

/// Offset just past the `\r\n\r\n` terminating the request head.
fn find_head_end(data: &[u8]) -> Option<usize> {
    data.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

/// IP portion of a `host:port` peer address.
fn client_ip(addr: &str) -> String {
    addr.rsplit_once(':')
        .map(|(ip, _)| ip)
        .unwrap_or(addr)
        .trim_matches(|c| c == '[' || c == ']')
        .to_string()
}

async fn handle_connection(mut stream: TcpStream, peer: SocketAddr, state: Arc<ServerState>) {
    state.stats.connection_opened();

    let read_timeout = state.config.timeouts.read_timeout();
    let max_size = state.config.limits.max_request_size;
    let mut requests_handled = 0u32;
    let mut buf = BytesMut::with_capacity(8 * 1024);

    'conn: loop {
        if requests_handled >= state.config.keep_alive.max_requests {
            debug!("keep-alive request limit reached");
            break;
        }

        buf.clear();
        let head_end = loop {
            if let Some(pos) = find_head_end(&buf) {
                break pos;
            }
            if buf.len() > max_size {
                warn!(peer = %peer, size = buf.len(), "request head too large");
                let response = Response::bad_request().text("Bad Request").build();
                let _ = stream.write_all(&response.serialize()).await;
                break 'conn;
            }

            let mut tmp = [0u8; 8192];
            match tokio::time::timeout(read_timeout, stream.read(&mut tmp)).await {
                Ok(Ok(0)) => {
                    debug!(peer = %peer, "connection closed by client");
                    break 'conn;
                },
                Ok(Ok(n)) => buf.extend_from_slice(&tmp[..n]),
                Ok(Err(e)) => {
                    debug!(peer = %peer, error = %e, "read error");
                    break 'conn;
                },
                Err(_) => {
                    debug!(peer = %peer, "read timeout");
                    break 'conn;
                },
            }
        };

        // Version guard: vet the raw request line before full parsing so an
        // unrecognized protocol token gets a well-formed 501 echoing the
        // token, and never an unhandled fault.
        if let Err(guard_err) = request::scan_version(&buf) {
            match guard_err {
                HttpError::UnsupportedVersion { token } => {
                    warn!(peer = %peer, token = %token, "unsupported protocol version");
                    let _ = stream.write_all(&Response::not_implemented_raw(&token)).await;
                },
                e => {
                    warn!(peer = %peer, error = %e, "malformed request line");
                    let response = Response::bad_request().text("Bad Request").build();
                    let _ = stream.write_all(&response.serialize()).await;
                },
            }
            break 'conn;
        }

        let (mut req, body_offset) = match Request::parse(&buf[..head_end]) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(peer = %peer, error = %e, "failed to parse request");
                let response = Response::bad_request().text("Bad Request").build();
                state.stats.record_response(400);
                let _ = stream.write_all(&response.serialize()).await;
                break 'conn;
            },
        };

        if let Some(length) = req.content_length() {
            let total = body_offset + length;
            if total > max_size {
                let response = Response::bad_request().text("Bad Request").build();
                let _ = stream.write_all(&response.serialize()).await;
                break 'conn;
            }
            while buf.len() < total {
                let mut tmp = [0u8; 8192];
                match tokio::time::timeout(read_timeout, stream.read(&mut tmp)).await {
                    Ok(Ok(0)) => break 'conn,
                    Ok(Ok(n)) => buf.extend_from_slice(&tmp[..n]),
                    _ => break 'conn,
                }
            }
            req.set_body(Bytes::copy_from_slice(&buf[body_offset..total]));
        }

        req.set_peer_addr(peer.to_string());
        state.stats.record_request();
        requests_handled += 1;

        let keep_alive = req.is_keep_alive() && state.config.keep_alive.enabled;

        let response = dispatch(&state, req).await;
        state.stats.record_response(response.status().as_u16());

        if let Err(e) = stream.write_all(&response.serialize()).await {
            debug!(peer = %peer, error = %e, "write error");
            break;
        }

        if !keep_alive {
            break;
        }
    }

    state.stats.connection_closed();
}

/// Route one request to a response, wrapping it in a Server span.
///
/// Telemetry endpoints are answered before span creation; tracing them
/// would refill the export buffer while tests drain it.
async fn dispatch(state: &Arc<ServerState>, request: Request) -> Response {
    let path = request.path().to_string();

    if path == state.config.telemetry.export_path {
        return export_response(state);
    }
    if path == state.config.telemetry.reset_path {
        state.tracer.reset();
        debug!("export buffer reset");
        return Response::ok().build();
    }

    let extracted = state.tracer.extract(request.headers());
    let resolution = state.routes.resolve(
        request.method(),
        &path,
        request.accept(),
        request.content_type(),
    );

    // Matched requests are named after the route template; unmatched ones
    // after the literal path.
    let span_name = match &resolution {
        Ok(matched) => matched.route.template().raw().to_string(),
        Err(_) => path.clone(),
    };

    let mut span = state.tracer.server_span(span_name, extracted);
    span.set_attribute("http.method", request.method().to_string());
    span.set_attribute("http.flavor", request.flavor());
    span.set_attribute("http.target", request.target());
    span.set_attribute("http.scheme", "http");
    span.set_attribute(
        "http.host",
        request.host().unwrap_or(&state.local_authority).to_string(),
    );
    if let Some(addr) = request.peer_addr() {
        span.set_attribute("http.client_ip", client_ip(addr));
    }
    if let Some(agent) = request.user_agent() {
        span.set_attribute("http.user_agent", agent.to_string());
    }

    let response = match resolution {
        Ok(matched) => {
            span.set_attribute("http.route", matched.route.template().raw().to_string());

            let ctx = RequestContext {
                request,
                params: matched.params.clone(),
                trace: TraceHandle::new(Arc::clone(&state.tracer), span.context()),
                client: state.client.clone(),
                local_authority: state.local_authority.clone(),
            };

            match invoke(&matched, ctx).await {
                Ok(response) => response,
                Err(e) => {
                    error!(route = %matched.route.template().raw(), error = %e, "handler failed");
                    Response::internal_error().text("Internal Server Error").build()
                },
            }
        },
        Err(e @ ResolveError::NotFound { .. }) => {
            debug!(path = %path, "no route matched");
            Response::not_found().text(e.to_string()).build()
        },
        Err(e @ ResolveError::NotAcceptable { .. }) => {
            Response::not_acceptable().text(e.to_string()).build()
        },
        Err(e @ ResolveError::UnsupportedMedia { .. }) => {
            Response::unsupported_media_type().text(e.to_string()).build()
        },
    };

    span.set_attribute("http.status_code", response.status().as_u16().to_string());
    state.tracer.finish(span);
    response
}

/// Run the matched handler, honoring the blocking flag.
async fn invoke(matched: &RouteMatch, ctx: RequestContext) -> HttpResult<Response> {
    let handler = matched
        .route
        .handler()
        .cloned()
        .ok_or_else(|| HttpError::Handler("terminal route without handler".to_string()))?;

    let fut = handler.handle(ctx);
    if matched.route.is_blocking() {
        // Blocking handlers run on their own task so a stalled handler
        // cannot wedge the connection loop.
        tokio::spawn(fut)
            .await
            .map_err(|e| HttpError::Handler(format!("handler task failed: {e}")))?
    } else {
        fut.await
    }
}

fn export_response(state: &Arc<ServerState>) -> Response {
    match serde_json::to_string(&state.tracer.export()) {
        Ok(json) => Response::ok().json(json).build(),
        Err(e) => {
            error!(error = %e, "failed to serialize export buffer");
            Response::internal_error().text("Internal Server Error").build()
        },
    }
}
