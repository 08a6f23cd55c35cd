//! End-to-end tracing tests over real TCP connections.
//!
//! Each test starts its own server on an OS-assigned port, drives it with an
//! untraced test client, and asserts on the spans served by the export
//! endpoint.

mod common;

use arclight::modules::tracing::{SpanId, TraceId};
use common::*;

#[tokio::test]
async fn direct_request_produces_one_root_server_span() {
    let server = spawn_server().await;

    let reply = get(server.addr, "/direct").await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("Direct trace"));

    let spans = await_span_count(server.addr, 1).await;
    let span = &spans[0];

    verify_resource(span);
    assert_eq!(span.name, "/direct");
    assert_eq!(span.kind, "SERVER");
    assert!(span.ended);

    assert_eq!(span.parent_span_id, invalid_span_id());
    assert_eq!(span.parent_link_span_id, invalid_span_id());
    assert_eq!(span.parent_link_trace_id, invalid_trace_id());
    assert!(!span.parent_valid);
    assert!(!span.parent_remote);

    assert_eq!(span.get("attr_http.method"), Some("GET"));
    assert_eq!(span.get("attr_http.flavor"), Some("1.1"));
    assert_eq!(span.get("attr_http.target"), Some("/direct"));
    assert_eq!(
        span.get("attr_http.host"),
        Some(server.authority().as_str())
    );
    assert_eq!(span.get("attr_http.scheme"), Some("http"));
    assert_eq!(span.get("attr_http.status_code"), Some("200"));
    assert!(span.get("attr_http.client_ip").is_some());
    assert!(span.get("attr_http.user_agent").is_some());
    assert_eq!(span.get("attr_http.route"), Some("/direct"));
}

#[tokio::test]
async fn chained_request_adds_internal_child_span() {
    let server = spawn_server().await;

    let reply = get(server.addr, "/chained").await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("Chained trace"));

    let spans = await_span_count(server.addr, 2).await;
    let trace_ids: std::collections::HashSet<_> =
        spans.iter().map(|s| s.trace_id.clone()).collect();
    assert_eq!(trace_ids.len(), 1);

    let parent = span_by_kind_and_parent(&spans, "SERVER", &invalid_span_id());
    verify_resource(parent);
    assert_eq!(parent.name, "/chained");
    assert_eq!(parent.get("attr_http.status_code"), Some("200"));

    let child = span_by_kind_and_parent(&spans, "INTERNAL", &parent.span_id);
    assert_eq!(child.name, "ChainService.call");
    assert_eq!(child.parent_link_span_id, parent.span_id);
    assert!(child.ended);
    assert!(child.parent_valid);
    assert!(!child.parent_remote);
}

async fn assert_three_span_chain(path: &str, expected_client_url_suffix: &str) {
    let server = spawn_server().await;

    let reply = get(server.addr, path).await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("No path trace"));

    let spans = await_span_count(server.addr, 3).await;
    let trace_ids: std::collections::HashSet<_> =
        spans.iter().map(|s| s.trace_id.clone()).collect();
    assert_eq!(trace_ids.len(), 1);

    let root = span_by_kind_and_parent(&spans, "SERVER", &invalid_span_id());
    verify_resource(root);
    assert_eq!(root.name, path);
    assert!(root.ended);
    assert!(!root.parent_valid);
    assert!(!root.parent_remote);
    assert_eq!(root.get("attr_http.target"), Some(path));
    assert_eq!(root.get("attr_http.route"), Some(path));
    assert_eq!(root.get("attr_http.status_code"), Some("200"));

    let client = span_by_kind_and_parent(&spans, "CLIENT", &root.span_id);
    verify_resource(client);
    assert_eq!(client.name, "HTTP GET");
    assert!(client.ended);
    assert!(client.parent_valid);
    assert!(!client.parent_remote);
    assert_eq!(client.get("attr_http.method"), Some("GET"));
    let expected_url = format!("http://{}{}", server.authority(), expected_client_url_suffix);
    assert_eq!(client.get("attr_http.url"), Some(expected_url.as_str()));
    assert_eq!(client.get("attr_http.status_code"), Some("200"));

    let inner = span_by_kind_and_parent(&spans, "SERVER", &client.span_id);
    verify_resource(inner);
    assert_eq!(inner.name, "/");
    assert!(inner.ended);
    assert!(inner.parent_valid);
    assert!(inner.parent_remote);
    assert_eq!(inner.get("attr_http.target"), Some("/"));
    assert_eq!(inner.get("attr_http.status_code"), Some("200"));
    assert_eq!(inner.parent_link_span_id, client.span_id);
}

#[tokio::test]
async fn nopath_client_call_produces_remote_parented_chain() {
    assert_three_span_chain("/nopath", "").await;
}

#[tokio::test]
async fn slashpath_client_call_produces_remote_parented_chain() {
    assert_three_span_chain("/slashpath", "/").await;
}

#[tokio::test]
async fn injected_carrier_becomes_remote_parent() {
    let server = spawn_server().await;

    let trace_id = TraceId::generate();
    let span_id = SpanId::generate();
    let traceparent = format!("00-{}-{}-01", trace_id.to_hex(), span_id.to_hex());

    let reply = get_with_headers(
        server.addr,
        "/direct",
        &[("traceparent", traceparent)],
    )
    .await;
    assert_eq!(reply.status, 200);

    let spans = await_span_count(server.addr, 1).await;
    let span = &spans[0];

    assert_eq!(span.trace_id, trace_id.to_hex());
    assert_eq!(span.parent_span_id, span_id.to_hex());
    assert_eq!(span.parent_link_span_id, span_id.to_hex());
    assert_eq!(span.parent_link_trace_id, trace_id.to_hex());
    assert!(span.parent_valid);
    assert!(span.parent_remote);
    assert_eq!(span.get("attr_http.status_code"), Some("200"));
}

#[tokio::test]
async fn malformed_carrier_degrades_to_root_trace() {
    let server = spawn_server().await;

    let reply = get_with_headers(
        server.addr,
        "/direct",
        &[("traceparent", "garbage-not-a-carrier".to_string())],
    )
    .await;
    assert_eq!(reply.status, 200);

    let spans = await_span_count(server.addr, 1).await;
    assert!(!spans[0].parent_valid);
    assert!(!spans[0].parent_remote);
}

#[tokio::test]
async fn path_parameter_names_span_by_template() {
    let server = spawn_server().await;

    let reply = get(server.addr, "/param/12345").await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("ParameterId: 12345"));

    let spans = await_span_count(server.addr, 1).await;
    let span = &spans[0];

    assert_eq!(span.name, "/param/{paramId}");
    assert_eq!(span.get("attr_http.target"), Some("/param/12345"));
    assert_eq!(span.get("attr_http.route"), Some("/param/{paramId}"));
    assert_eq!(span.get("attr_http.status_code"), Some("200"));
}

#[tokio::test]
async fn deep_path_naming() {
    let server = spawn_server().await;

    let reply = get(server.addr, "/deep/path").await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("Deep url path"));

    let spans = await_span_count(server.addr, 1).await;
    assert_eq!(spans[0].name, "/deep/path");
    assert_eq!(spans[0].get("attr_http.target"), Some("/deep/path"));
}

#[tokio::test]
async fn templated_locator_path_resolves_and_names_span() {
    let server = spawn_server().await;

    let reply = get(server.addr, "/template/path/something").await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("Received: something"));

    let spans = await_span_count(server.addr, 1).await;
    assert_eq!(spans[0].name, "/template/path/{value}");
    assert_eq!(
        spans[0].get("attr_http.target"),
        Some("/template/path/something")
    );
    assert_eq!(
        spans[0].get("attr_http.route"),
        Some("/template/path/{value}")
    );
}

async fn assert_ping_chain(path_prefix: &str) {
    let server = spawn_server().await;

    let reply = get(server.addr, &format!("{path_prefix}/one")).await;
    assert_eq!(reply.status, 200);
    assert!(reply.body.contains("one"));

    let spans = await_span_count(server.addr, 3).await;
    let trace_ids: std::collections::HashSet<_> =
        spans.iter().map(|s| s.trace_id.clone()).collect();
    assert_eq!(trace_ids.len(), 1);

    let root = span_by_kind_and_parent(&spans, "SERVER", &invalid_span_id());
    assert_eq!(root.name, format!("{path_prefix}/{{message}}"));
    assert_eq!(
        root.get("attr_http.target"),
        Some(format!("{path_prefix}/one").as_str())
    );

    let client = span_by_kind_and_parent(&spans, "CLIENT", &root.span_id);
    assert_eq!(client.name, "HTTP GET");
    let expected_url = format!("http://{}/client/pong/one", server.authority());
    assert_eq!(client.get("attr_http.url"), Some(expected_url.as_str()));

    let inner = span_by_kind_and_parent(&spans, "SERVER", &client.span_id);
    assert_eq!(inner.name, "/client/pong/{message}");
    assert_eq!(inner.get("attr_http.route"), Some("/client/pong/{message}"));
    assert!(inner.parent_remote);
}

#[tokio::test]
async fn client_ping_produces_templated_three_span_chain() {
    assert_ping_chain("/client/ping").await;
}

#[tokio::test]
async fn async_client_ping_produces_templated_three_span_chain() {
    assert_ping_chain("/client/async-ping").await;
}

#[tokio::test]
async fn unknown_route_is_404_and_traced() {
    let server = spawn_server().await;

    let reply = get(server.addr, "/missing").await;
    assert_eq!(reply.status, 404);
    assert!(reply.status_line.contains("404"));

    let spans = await_span_count(server.addr, 1).await;
    assert_eq!(spans[0].name, "/missing");
    assert_eq!(spans[0].get("attr_http.status_code"), Some("404"));
    assert_eq!(spans[0].get("attr_http.route"), None);
}

#[tokio::test]
async fn unacceptable_media_type_is_406_not_404() {
    let server = spawn_server().await;

    let reply = get_accepting(server.addr, "/direct", "text/html").await;
    assert_eq!(reply.status, 406);

    let reply = get_accepting(server.addr, "/direct", "application/json").await;
    assert_eq!(reply.status, 200);

    let reply = get_accepting(server.addr, "/missing", "text/html").await;
    assert_eq!(reply.status, 404);
}

#[tokio::test]
async fn wrong_http_version_gets_501_echoing_token() {
    let server = spawn_server().await;

    let raw = raw_request(server.addr, "GET /client/ping/1 HTTP/50.0\r\n\r\n").await;
    let first_line = raw.lines().next().unwrap_or_default();
    assert_eq!(first_line, "HTTP/50.0 501 Not Implemented");

    // The connection handler survived; the server keeps serving.
    let reply = get(server.addr, "/direct").await;
    assert_eq!(reply.status, 200);
}

#[tokio::test]
async fn garbage_version_token_is_echoed_too() {
    let server = spawn_server().await;

    let raw = raw_request(server.addr, "GET / FTP/9\r\n\r\n").await;
    let first_line = raw.lines().next().unwrap_or_default();
    assert_eq!(first_line, "FTP/9 501 Not Implemented");
}

#[tokio::test]
async fn reset_drains_buffer_and_forgets_old_spans() {
    let server = spawn_server().await;

    get(server.addr, "/direct").await;
    get(server.addr, "/param/42").await;
    let before = await_span_count(server.addr, 2).await;
    let old_ids: Vec<String> = before.iter().map(|s| s.span_id.clone()).collect();

    reset(server.addr).await;

    get(server.addr, "/direct").await;
    let after = await_span_count(server.addr, 1).await;
    assert!(!old_ids.contains(&after[0].span_id));
}

#[tokio::test]
async fn telemetry_endpoints_are_not_traced() {
    let server = spawn_server().await;

    get(server.addr, "/export").await;
    get(server.addr, "/reset").await;
    get(server.addr, "/export").await;

    // Only ever the spans from traced routes; none from the endpoints above.
    let spans = get_spans(server.addr).await;
    assert!(spans.is_empty());
    assert_eq!(server.tracer.buffered(), 0);
}
