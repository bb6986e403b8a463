//! Batch Coalescer hot-path benchmark: `add()` throughput under rapid
//! distinct-path writes, with the background flush loop parked on a long
//! interval and a threshold above the probe size so no flush runs during
//! measurement.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use syncgraph_core::types::{ChangeEvent, ChangeKind};
use syncgraph_engine::BatchCoalescer;

fn bench_add_distinct_paths(c: &mut Criterion) {
    for &size in &[10usize, 100, 1_000] {
        let process: Arc<syncgraph_engine::coalescer::ProcessFn> = Arc::new(|_batch| Ok(()));
        let coalescer = BatchCoalescer::start(size + 1, Duration::from_secs(3600), 3, process);

        c.bench_function(&format!("coalescer_add_{size}_distinct_paths"), |b| {
            b.iter(|| {
                for i in 0..size {
                    coalescer.add(black_box(ChangeEvent::new(
                        PathBuf::from(format!("file_{i}.ts")),
                        ChangeKind::Modify,
                    )));
                }
            })
        });

        coalescer.stop();
    }
}

fn bench_add_same_path_repeated(c: &mut Criterion) {
    let process: Arc<syncgraph_engine::coalescer::ProcessFn> = Arc::new(|_batch| Ok(()));
    let coalescer = BatchCoalescer::start(usize::MAX, Duration::from_secs(3600), 3, process);

    c.bench_function("coalescer_add_same_path_1000_times", |b| {
        b.iter(|| {
            for _ in 0..1_000 {
                coalescer.add(black_box(ChangeEvent::new(PathBuf::from("hot.ts"), ChangeKind::Modify)));
            }
        })
    });

    coalescer.stop();
}

criterion_group!(benches, bench_add_distinct_paths, bench_add_same_path_repeated);
criterion_main!(benches);
