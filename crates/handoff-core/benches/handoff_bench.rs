//! Handoff primitive benchmarks.
//!
//! Measures the steady-state cost of each primitive's hot operations.
//!
//! Targets on commodity x86_64:
//! - ring push/pop: < 20ns
//! - pool acquire/release: < 15ns
//! - double buffer commit: < 5ns
//!
//! Run with: cargo bench -p handoff-core

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use handoff_core::{DoubleBuffer, EventBus, FixedPool, RingBuffer, SharedDoubleBuffer};

/// Ring push+pop cycle at a few capacities.
fn bench_ring_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_cycle");
    group.throughput(Throughput::Elements(1));

    group.bench_function(BenchmarkId::new("capacity", 16), |b| {
        let ring: RingBuffer<u64, 16> = RingBuffer::new();
        let mut value = 0u64;
        b.iter(|| {
            let _ = ring.push(black_box(value));
            value = value.wrapping_add(1);
            black_box(ring.pop())
        });
    });

    group.bench_function(BenchmarkId::new("capacity", 1024), |b| {
        let ring: RingBuffer<u64, 1024> = RingBuffer::new();
        let mut value = 0u64;
        b.iter(|| {
            let _ = ring.push(black_box(value));
            value = value.wrapping_add(1);
            black_box(ring.pop())
        });
    });

    group.finish();
}

/// Overwrite-policy push on a permanently full ring.
fn bench_ring_push_overwrite(c: &mut Criterion) {
    c.bench_function("ring_push_overwrite_full", |b| {
        let mut ring: RingBuffer<u64, 64> = RingBuffer::new();
        let mut value = 0u64;
        b.iter(|| {
            value = value.wrapping_add(1);
            black_box(ring.push_overwrite(black_box(value)))
        });
    });
}

/// Pool acquire+release cycle with a payload-sized tenant.
fn bench_pool_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("pool_cycle");
    group.throughput(Throughput::Elements(1));

    group.bench_function("u64", |b| {
        let mut pool: FixedPool<u64, 64> = FixedPool::new();
        b.iter(|| {
            let slot = pool.acquire().expect("pool has room");
            *pool.get_mut(&slot) = black_box(7);
            pool.release(slot);
        });
    });

    group.bench_function("frame_256b", |b| {
        let mut pool: FixedPool<[u8; 256], 64> = FixedPool::new();
        b.iter(|| {
            let slot = pool.acquire().expect("pool has room");
            pool.get_mut(&slot)[0] = black_box(7);
            pool.release(slot);
        });
    });

    group.finish();
}

/// Role swap on both double buffer forms.
fn bench_frame_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_commit");

    group.bench_function("plain", |b| {
        let mut frame: DoubleBuffer<u64, 128> = DoubleBuffer::new();
        b.iter(|| {
            frame.write_half()[0] = black_box(1);
            frame.commit();
            black_box(frame.read_half()[0])
        });
    });

    group.bench_function("shared_atomic", |b| {
        let mut buf: SharedDoubleBuffer<u64, 128> = SharedDoubleBuffer::new();
        let (mut writer, mut reader) = buf.split();
        b.iter(|| {
            writer.half()[0] = black_box(1);
            writer.commit();
            black_box(reader.half()[0])
        });
    });

    group.finish();
}

/// Bus dispatch cycle: payload written once, handle queued, payload moved
/// out on delivery.
fn bench_bus_cycle(c: &mut Criterion) {
    c.bench_function("bus_cycle_128b", |b| {
        let mut bus: EventBus<[u8; 128], 16> = EventBus::new();
        b.iter(|| {
            bus.push(black_box([7u8; 128])).expect("bus has room");
            black_box(bus.pop())
        });
    });
}

criterion_group!(
    benches,
    bench_ring_cycle,
    bench_ring_push_overwrite,
    bench_pool_cycle,
    bench_frame_commit,
    bench_bus_cycle
);
criterion_main!(benches);
