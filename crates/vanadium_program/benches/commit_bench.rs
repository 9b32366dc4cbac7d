//! Commit and incremental re-analysis benchmarks.
//!
//! Run with: cargo bench -p vanadium_program

use criterion::{black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use vanadium_core::intern::StringInterner;
use vanadium_program::Program;

/// A chain of modules: each imports its predecessor publicly and uses its
/// constant, component and the constant of the module two steps back.
fn generate_modules(count: usize) -> Vec<(String, String)> {
    (0..count)
        .map(|i| {
            let text = if i == 0 {
                "module M0 {
    type component C0 { var integer field0; }
    const integer k0 := 0;
}"
                .to_string()
            } else {
                let prev = i - 1;
                let far = i.saturating_sub(2);
                format!(
                    "module M{i} {{
    public import from M{prev} all;
    type component C{i} extends C{prev} {{ var integer field{i}; }}
    const integer k{i} := k{prev} + k{far};
    testcase t{i}() runs on C{prev} {{ field0 := k{i}; }}
}}"
                )
            };
            (format!("m{i}.ttcn"), text)
        })
        .collect()
}

fn committed(modules: &[(String, String)]) -> std::sync::Arc<Program> {
    let program = Program::new("bench", StringInterner::new());
    let errors = program.commit(|m| {
        for (path, text) in modules {
            m.update_text(path.clone(), text.clone());
        }
    });
    assert!(errors.is_empty());
    program
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");
    for count in [10, 100] {
        let modules = generate_modules(count);
        group.bench_with_input(BenchmarkId::new("fresh", count), &modules, |b, modules| {
            b.iter(|| black_box(committed(modules)));
        });
    }
    group.finish();
}

fn bench_edit(c: &mut Criterion) {
    let mut group = c.benchmark_group("edit");
    let modules = generate_modules(100);
    for (label, index) in [("leaf", 99), ("root", 0)] {
        let (path, text) = modules[index].clone();
        let edited = text.replacen('{', "{\n    const integer extra := 1;", 1);
        group.bench_function(label, |b| {
            b.iter_batched(
                || committed(&modules),
                |program| {
                    let errors = program.commit(|m| {
                        m.update_text(path.clone(), edited.clone());
                    });
                    black_box(errors)
                },
                BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_commit, bench_edit);
criterion_main!(benches);
