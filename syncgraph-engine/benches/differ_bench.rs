//! Differ hot-path benchmark: re-diffing a file's parse against the cached
//! prior parse, at a few tree sizes. Mirrors the teacher's per-size-bucket
//! benchmark shape (`drift-analysis/benches/confidence_bench.rs`).

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use syncgraph_core::types::{FunctionEntity, ParsedFile};
use syncgraph_engine::Differ;

fn make_parse(path: &str, function_count: usize, start_offset: u32) -> ParsedFile {
    let functions = (0..function_count)
        .map(|i| FunctionEntity {
            name: format!("fn_{i}"),
            file_path: path.to_string(),
            start_line: start_offset + (i as u32) * 10,
            end_line: start_offset + (i as u32) * 10 + 5,
            signature: "()".to_string(),
            is_async: i % 4 == 0,
            is_exported: true,
        })
        .collect();

    ParsedFile {
        path: path.to_string(),
        functions,
        ..Default::default()
    }
}

fn bench_analyze_no_op(c: &mut Criterion) {
    for &size in &[10usize, 100, 1_000] {
        let differ = Differ::new();
        differ.analyze(make_parse("bench.ts", size, 0));

        c.bench_function(&format!("differ_analyze_no_op_{size}_functions"), |b| {
            b.iter(|| {
                let (delta, changed) = differ.analyze(black_box(make_parse("bench.ts", size, 0)));
                black_box((delta, changed));
            })
        });
    }
}

fn bench_analyze_all_modified(c: &mut Criterion) {
    for &size in &[10usize, 100, 1_000] {
        c.bench_function(&format!("differ_analyze_all_modified_{size}_functions"), |b| {
            b.iter_batched(
                || {
                    let differ = Differ::new();
                    differ.analyze(make_parse("bench.ts", size, 0));
                    differ
                },
                |differ| {
                    let (delta, changed) = differ.analyze(black_box(make_parse("bench.ts", size, 1)));
                    black_box((delta, changed));
                },
                BatchSize::SmallInput,
            )
        });
    }
}

criterion_group!(benches, bench_analyze_no_op, bench_analyze_all_modified);
criterion_main!(benches);
