//! Correlation engine microbenchmarks.
//!
//! Benchmarks the hot pieces of the per-command path:
//! - Command ID allocation
//! - Field extraction from raw frames
//! - Frame classification
//! - Pending-table insert/resolve churn
//!
//! Run with: cargo bench --bench correlation
//! Results saved to: target/criterion/

use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use tokio::sync::oneshot;

use cdp_pipe::protocol::{Frame, Reply, extract_field};
use cdp_pipe::transport::PendingCommands;
use cdp_pipe::{CommandId, CommandIdAllocator};

// ============================================================================
// Sample Frames
// ============================================================================

const REPLY_FRAME: &str = r#"{"id":1024,"result":{"frame":{"id":"F1","loaderId":"L1","url":"https://example.com"},"loaderId":"L1"}}"#;
const EVENT_FRAME: &str =
    r#"{"method":"Target.targetCreated","params":{"targetInfo":{"targetId":"T1"}}}"#;

// ============================================================================
// Benchmark: ID Allocation
// ============================================================================

fn bench_id_allocation(c: &mut Criterion) {
    let alloc = CommandIdAllocator::new();

    c.bench_function("id_allocation", |b| {
        b.iter(|| black_box(alloc.next()));
    });
}

// ============================================================================
// Benchmark: Field Extraction
// ============================================================================

fn bench_field_extraction(c: &mut Criterion) {
    let mut group = c.benchmark_group("extract_field");

    group.bench_function("bare_id", |b| {
        b.iter(|| black_box(extract_field(black_box(REPLY_FRAME), "id")));
    });
    group.bench_function("nested_object", |b| {
        b.iter(|| black_box(extract_field(black_box(REPLY_FRAME), "result")));
    });
    group.bench_function("missing", |b| {
        b.iter(|| black_box(extract_field(black_box(REPLY_FRAME), "missing")));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Frame Classification
// ============================================================================

fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify");

    group.bench_function("reply", |b| {
        b.iter(|| black_box(Frame::classify(black_box(REPLY_FRAME))));
    });
    group.bench_function("event", |b| {
        b.iter(|| black_box(Frame::classify(black_box(EVENT_FRAME))));
    });

    group.finish();
}

// ============================================================================
// Benchmark: Pending Table Churn
// ============================================================================

fn bench_pending_churn(c: &mut Criterion) {
    let pending = PendingCommands::new();
    let alloc = CommandIdAllocator::new();

    c.bench_function("pending_register_complete", |b| {
        b.iter(|| {
            let id = alloc.next();
            let (tx, rx) = oneshot::channel();
            pending.register(black_box(id), tx).ok().expect("fresh id");
            pending.complete(id, Reply::new(id, REPLY_FRAME));
            black_box(rx)
        });
    });
}

criterion_group!(
    benches,
    bench_id_allocation,
    bench_field_extraction,
    bench_classification,
    bench_pending_churn
);
criterion_main!(benches);
