//! Benchmarks for asset discovery and rendering.
//!
//! These benchmarks measure Phase 1 (walking and filtering template roots)
//! and Phase 2 (rendering with a header and values) over generated trees.

use applier::phases::{phase1, phase2, Sources};
use applier::values::ValuesDocument;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::fs;
use tempfile::TempDir;

/// Creates a template tree with `num_files` assets spread over subdirectories.
fn create_tree(num_files: usize) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("header.txt"), "apiVersion: v1\n").unwrap();
    for i in 0..num_files {
        let dir = temp.path().join(format!("group{}", i / 50));
        fs::create_dir_all(&dir).unwrap();
        let content = format!(
            "kind: ConfigMap\nmetadata:\n  name: {{{{ .Prefix }}}}-{}\n  namespace: {{{{ .Namespace }}}}\ndata:\n  index: \"{}\"\n",
            i, i
        );
        fs::write(dir.join(format!("cm{}.yaml", i)), content).unwrap();
    }
    temp
}

fn sources(temp: &TempDir) -> Sources {
    Sources {
        paths: vec![temp.path().to_path_buf()],
        header: Some(temp.path().join("header.txt")),
        ..Default::default()
    }
}

fn bench_discovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("discovery");

    for count in [10, 100, 500] {
        let temp = create_tree(count);
        let sources = sources(&temp);
        group.bench_with_input(BenchmarkId::new("select", count), &sources, |b, sources| {
            b.iter(|| phase1::execute(black_box(sources)).unwrap())
        });
    }

    let temp = create_tree(500);
    let mut excluding = sources(&temp);
    excluding.exclude = vec!["**/group1/*".to_string(), "**/cm4*.yaml".to_string()];
    group.bench_function("select_with_globs", |b| {
        b.iter(|| phase1::execute(black_box(&excluding)).unwrap())
    });

    group.finish();
}

fn bench_rendering(c: &mut Criterion) {
    let mut group = c.benchmark_group("rendering");
    let values = ValuesDocument::parse(b"Prefix: app\nNamespace: prod\n").unwrap();

    for count in [10, 100] {
        let temp = create_tree(count);
        let selection = phase1::execute(&sources(&temp)).unwrap();
        group.bench_with_input(BenchmarkId::new("render", count), &selection, |b, selection| {
            b.iter(|| phase2::execute(black_box(selection), &values).unwrap())
        });
        let documents = phase2::execute(&selection, &values).unwrap();
        group.bench_with_input(
            BenchmarkId::new("extract", count),
            &documents,
            |b, documents| b.iter(|| phase2::extract(black_box(documents)).unwrap()),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_discovery, bench_rendering);
criterion_main!(benches);
