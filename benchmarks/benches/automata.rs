use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use schema_core::automata::enumerate::{enumerate, EnumerateBudget};
use schema_core::automata::{dfa, nfa, parser, product};

const PATTERNS: &[&str] = &["^[a-z]{3,8}$", "^(?:foo|bar|baz)[0-9]+$", "^[A-Za-z0-9_-]+@[a-z]+\\.[a-z]{2,3}$"];

fn bench_parse_and_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_compile");
    for pattern in PATTERNS {
        group.bench_with_input(BenchmarkId::from_parameter(pattern), pattern, |b, p| {
            b.iter(|| {
                let ast = parser::parse(p).expect("valid pattern");
                let n = nfa::compile(&ast.ast);
                black_box(dfa::compile(&n))
            });
        });
    }
    group.finish();
}

fn bench_enumerate(c: &mut Criterion) {
    let mut group = c.benchmark_group("pattern_enumerate");
    for pattern in PATTERNS {
        let ast = parser::parse(pattern).expect("valid pattern");
        let n = nfa::compile(&ast.ast);
        let d = dfa::compile(&n);
        let prod = product::build(&[d], 4096);
        group.bench_with_input(BenchmarkId::from_parameter(pattern), &prod, |b, prod| {
            b.iter(|| black_box(enumerate(prod, EnumerateBudget { max_length: 12, max_candidates: 32 })));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse_and_compile, bench_enumerate);
criterion_main!(benches);
