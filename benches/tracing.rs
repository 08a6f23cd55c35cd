#![allow(clippy::all)]
//! Benchmarks for span lifecycle, carrier propagation, and export.

use arclight::modules::tracing::{
    ExportedSpan, Resource, SpanId, TraceContextPropagator, TraceId, Tracer,
};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;

fn bench_span_lifecycle(c: &mut Criterion) {
    let tracer = Tracer::new(Resource::new("bench", "0"), 1024);
    let mut group = c.benchmark_group("tracing/span");

    group.bench_function("server_span_root", |b| {
        b.iter(|| tracer.server_span(black_box("/direct"), None))
    });

    group.bench_function("finish_and_reset", |b| {
        b.iter(|| {
            let span = tracer.server_span("/direct", None);
            tracer.finish(span);
            tracer.reset();
        })
    });

    group.finish();
}

fn bench_propagation(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracing/propagation");

    let header = "00-0af7651916cd43dd8448eb211c80319c-b7ad6b7169203331-01";
    group.bench_function("parse_traceparent", |b| {
        b.iter(|| TraceContextPropagator::parse_traceparent(black_box(header)))
    });

    let trace_id = TraceId::generate();
    let span_id = SpanId::generate();
    group.bench_function("format_traceparent", |b| {
        b.iter(|| TraceContextPropagator::format_traceparent(black_box(&trace_id), &span_id))
    });

    group.finish();
}

fn bench_export(c: &mut Criterion) {
    let resource = Resource::new("bench", "0");
    let tracer = Tracer::new(resource.clone(), 1024);
    let mut span = tracer.server_span("/param/{paramId}", None);
    span.set_attribute("http.method", "GET");
    span.set_attribute("http.target", "/param/12345");
    span.set_attribute("http.status_code", "200");
    span.end();

    let mut group = c.benchmark_group("tracing/export");

    group.bench_function("flatten_span", |b| {
        b.iter(|| ExportedSpan::from_span(black_box(&span), &resource))
    });

    let exported = ExportedSpan::from_span(&span, &resource);
    group.bench_function("serialize_json", |b| {
        b.iter(|| serde_json::to_string(black_box(&exported)))
    });

    group.finish();
}

criterion_group!(benches, bench_span_lifecycle, bench_propagation, bench_export);
criterion_main!(benches);
