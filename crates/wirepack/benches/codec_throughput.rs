// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::cast_possible_truncation)] // Bench parameters
#![allow(clippy::cast_precision_loss)] // Synthetic data
#![allow(clippy::missing_panics_doc)] // Benches panic on failure

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::HashMap;
use wirepack::{encode_into, from_bytes, to_bytes, BufferPool, Wire, WriteBuffer};

#[derive(Wire, Debug, Default, Clone, PartialEq)]
#[wire(reference)]
struct Trade {
    id: u64,
    symbol: String,
    price: f64,
    quantity: u32,
    venue: Option<String>,
    fills: Vec<Fill>,
}

#[derive(Wire, Debug, Default, Clone, Copy, PartialEq)]
#[wire(fixed)]
struct Fill {
    at: u64,
    price: f64,
    size: u32,
}

fn trade(i: usize) -> Trade {
    Trade {
        id: i as u64,
        symbol: format!("SYM{}", i % 97),
        price: 100.0 + i as f64 * 0.25,
        quantity: (i % 1000) as u32,
        venue: (i % 3 != 0).then(|| "XPAR".to_string()),
        fills: (0..4)
            .map(|k| Fill {
                at: (i * 10 + k) as u64,
                price: 100.0,
                size: k as u32,
            })
            .collect(),
    }
}

// ============================================================================
// Fixed-layout fast path vs per-element dispatch
// ============================================================================

fn bench_scalar_runs(c: &mut Criterion) {
    let mut group = c.benchmark_group("scalar_runs");
    for len in [16_usize, 1024, 65_536] {
        let ints: Vec<u32> = (0..len as u32).collect();
        let strings: Vec<String> = (0..len).map(|i| i.to_string()).collect();
        group.throughput(Throughput::Elements(len as u64));

        group.bench_with_input(BenchmarkId::new("encode_u32", len), &ints, |b, v| {
            b.iter(|| to_bytes(black_box(v)).unwrap())
        });
        let bytes = to_bytes(&ints).unwrap();
        group.bench_with_input(BenchmarkId::new("decode_u32", len), &bytes, |b, v| {
            b.iter(|| from_bytes::<Vec<u32>>(black_box(v)).unwrap())
        });

        group.bench_with_input(BenchmarkId::new("encode_string", len), &strings, |b, v| {
            b.iter(|| to_bytes(black_box(v)).unwrap())
        });
        let bytes = to_bytes(&strings).unwrap();
        group.bench_with_input(BenchmarkId::new("decode_string", len), &bytes, |b, v| {
            b.iter(|| from_bytes::<Vec<String>>(black_box(v)).unwrap())
        });
    }
    group.finish();
}

// ============================================================================
// Object graphs
// ============================================================================

fn bench_objects(c: &mut Criterion) {
    let trades: Vec<Trade> = (0..256).map(trade).collect();
    let bytes = to_bytes(&trades).unwrap();

    let mut group = c.benchmark_group("objects");
    group.throughput(Throughput::Bytes(bytes.len() as u64));
    group.bench_function("encode_trades", |b| {
        b.iter(|| to_bytes(black_box(&trades)).unwrap())
    });
    group.bench_function("decode_trades", |b| {
        b.iter(|| from_bytes::<Vec<Trade>>(black_box(&bytes)).unwrap())
    });

    let book: HashMap<String, Trade> = trades
        .iter()
        .map(|t| (format!("{}-{}", t.symbol, t.id), t.clone()))
        .collect();
    group.bench_function("encode_map", |b| {
        b.iter(|| to_bytes(black_box(&book)).unwrap())
    });
    group.finish();
}

// ============================================================================
// Buffer reuse
// ============================================================================

fn bench_buffer_reuse(c: &mut Criterion) {
    let value = trade(7);
    let mut group = c.benchmark_group("buffer");

    group.bench_function("fresh_buffer", |b| {
        b.iter(|| {
            let mut buf = WriteBuffer::with_pool(64, 1 << 20, None);
            encode_into(black_box(&value), &mut buf).unwrap();
            buf.position()
        })
    });

    let pool = std::sync::Arc::new(BufferPool::new());
    group.bench_function("pooled_buffer", |b| {
        b.iter(|| {
            let mut buf = WriteBuffer::with_pool(64, 1 << 20, Some(pool.clone()));
            encode_into(black_box(&value), &mut buf).unwrap();
            buf.position()
        })
    });

    let mut reused = WriteBuffer::new();
    group.bench_function("cleared_buffer", |b| {
        b.iter(|| {
            reused.clear();
            encode_into(black_box(&value), &mut reused).unwrap();
            reused.position()
        })
    });
    group.finish();
}

criterion_group!(benches, bench_scalar_runs, bench_objects, bench_buffer_reuse);
criterion_main!(benches);
