use std::hint::black_box;

use bytes::BytesMut;
use criterion::{Criterion, criterion_group, criterion_main};
use micro_headers::{RequestHeaders, ResponseHeaders};

fn bench_literal_append(c: &mut Criterion) {
    let mut group = c.benchmark_group("append");

    group.bench_function("known_headers", |b| {
        let mut headers = RequestHeaders::new();
        b.iter(|| {
            headers.append(black_box(b"Host"), black_box(b"example.com"), false).unwrap();
            headers.append(black_box(b"User-Agent"), black_box(b"curl/8.5.0"), false).unwrap();
            headers.append(black_box(b"Accept"), black_box(b"*/*"), false).unwrap();
            headers.append(black_box(b"Accept-Encoding"), black_box(b"gzip, deflate, br"), false).unwrap();
            headers.clear();
        });
    });

    group.bench_function("unknown_headers", |b| {
        let mut headers = RequestHeaders::new();
        b.iter(|| {
            headers.append(black_box(b"X-Request-Start"), black_box(b"1735689600"), false).unwrap();
            headers.append(black_box(b"X-Forwarded-Proto"), black_box(b"https"), false).unwrap();
            headers.clear();
        });
    });

    group.bench_function("pooled_reuse_cycle", |b| {
        let mut headers = RequestHeaders::new();
        headers.append(b"Host", b"example.com", false).unwrap();
        headers.append(b"User-Agent", b"curl/8.5.0", false).unwrap();
        headers.append(b"Accept", b"*/*", false).unwrap();
        b.iter(|| {
            headers.begin_reuse();
            headers.append(black_box(b"Host"), black_box(b"example.com"), false).unwrap();
            headers.append(black_box(b"User-Agent"), black_box(b"curl/8.5.0"), false).unwrap();
            headers.append(black_box(b"Accept"), black_box(b"*/*"), false).unwrap();
            headers.finish_reuse();
        });
    });

    group.finish();
}

fn bench_lookup(c: &mut Criterion) {
    let mut headers = RequestHeaders::new();
    headers.append(b"Host", b"example.com", false).unwrap();
    headers.append(b"Accept-Encoding", b"gzip", false).unwrap();

    let mut group = c.benchmark_group("lookup");
    group.bench_function("hit_mixed_case", |b| {
        b.iter(|| black_box(headers.get(black_box("aCcEpT-eNcOdInG"))));
    });
    group.bench_function("miss", |b| {
        b.iter(|| black_box(headers.get(black_box("X-Not-There"))));
    });
    group.finish();
}

fn bench_serialize(c: &mut Criterion) {
    let mut headers = ResponseHeaders::new();
    headers.set_content_length(Some(1024)).unwrap();
    headers.set_content_type("text/html; charset=utf-8").unwrap();
    headers.set_server("micro/0.1").unwrap();
    headers.set_vary("Accept-Encoding").unwrap();

    c.bench_function("serialize_response", |b| {
        let mut sink = BytesMut::with_capacity(4 * 1024);
        b.iter(|| {
            sink.clear();
            headers.write_to(&mut sink);
            black_box(&sink);
        });
    });
}

criterion_group!(benches, bench_literal_append, bench_lookup, bench_serialize);
criterion_main!(benches);
