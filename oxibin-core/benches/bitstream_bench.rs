//! Throughput benchmarks for bit readers and ring buffer streams
//!
//! This benchmark suite evaluates:
//! - Fixed-width reads on 32- and 64-bit windows
//! - Mixed-width reads typical of prefix-code decoding
//! - Ring buffer write/read cycles that force wraparound
//! - Byte scanning across the physical wrap point

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use oxibin_core::bitstream::{BitReader32, BitReader64};
use oxibin_core::stream::{RingBufferStream, ShortRingBufferStream};
use std::hint::black_box;

/// Reproducible pseudo-random payload.
fn payload(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut seed: u64 = 0x123456789ABCDEF0;
    for _ in 0..size {
        // Linear congruential generator
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        data.push((seed >> 32) as u8);
    }
    data
}

fn bench_fixed_width(c: &mut Criterion) {
    let data = payload(64 * 1024);
    let mut group = c.benchmark_group("bit_reader_fixed");
    group.throughput(Throughput::Bytes(data.len() as u64));

    for width in [1u32, 7, 13, 24] {
        group.bench_with_input(BenchmarkId::new("w32", width), &width, |b, &width| {
            b.iter(|| {
                let mut reader = BitReader32::new(&data[..]);
                let mut acc = 0u32;
                while let Ok(v) = reader.read(width) {
                    acc = acc.wrapping_add(v);
                }
                black_box(acc)
            })
        });
        group.bench_with_input(BenchmarkId::new("w64", width), &width, |b, &width| {
            b.iter(|| {
                let mut reader = BitReader64::new(&data[..]);
                let mut acc = 0u64;
                while let Ok(v) = reader.read(width) {
                    acc = acc.wrapping_add(v);
                }
                black_box(acc)
            })
        });
    }

    group.finish();
}

fn bench_mixed_width(c: &mut Criterion) {
    let data = payload(64 * 1024);
    let widths = [3u32, 9, 1, 15, 5, 2, 11, 7];
    let mut group = c.benchmark_group("bit_reader_mixed");
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("peek_skip_w64", |b| {
        b.iter(|| {
            let mut reader = BitReader64::new(&data[..]);
            let mut acc = 0u64;
            'outer: loop {
                for &w in &widths {
                    match reader.peek(16) {
                        Ok(v) => acc = acc.wrapping_add(v),
                        Err(_) => break 'outer,
                    }
                    if reader.skip(u64::from(w)).is_err() {
                        break 'outer;
                    }
                }
            }
            black_box(acc)
        })
    });

    group.finish();
}

fn bench_ring_cycle(c: &mut Criterion) {
    let chunk = payload(1500);
    let mut out = vec![0u8; chunk.len()];
    let mut group = c.benchmark_group("ring_buffer_cycle");
    group.throughput(Throughput::Bytes(chunk.len() as u64 * 100));

    group.bench_function("masked_4k", |b| {
        let mut ring = RingBufferStream::new(4096);
        b.iter(|| {
            for _ in 0..100 {
                ring.write(&chunk).unwrap();
                ring.read(&mut out).unwrap();
            }
            black_box(ring.read_position())
        })
    });

    group.bench_function("short_64k", |b| {
        let mut ring = ShortRingBufferStream::wrapping();
        b.iter(|| {
            for _ in 0..100 {
                ring.write(&chunk).unwrap();
                ring.read(&mut out).unwrap();
            }
            black_box(ring.read_position())
        })
    });

    group.finish();
}

fn bench_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer_scan");

    let mut ring = RingBufferStream::new(1 << 16);
    ring.write(&vec![0u8; 1 << 15]).unwrap();
    ring.seek(1 << 15).unwrap();
    let mut body = vec![0xAAu8; 1 << 16];
    body[(1 << 16) - 1] = b'\n';
    ring.write(&body).unwrap();

    group.throughput(Throughput::Bytes(ring.len() as u64));
    group.bench_function("newline_at_end", |b| b.iter(|| black_box(ring.scan(b'\n'))));

    group.finish();
}

criterion_group!(
    benches,
    bench_fixed_width,
    bench_mixed_width,
    bench_ring_cycle,
    bench_scan
);
criterion_main!(benches);
