use criterion::{black_box, criterion_group, criterion_main, Criterion};
use diagnosis::{create_environment, evaluate, SymptomReport};

fn bench_diagnose(c: &mut Criterion) {
    c.bench_function("build_knowledge_base", |b| {
        b.iter(|| create_environment().map(|env| env.rules().len()))
    });

    c.bench_function("evaluate_both_symptoms", |b| {
        b.iter(|| evaluate(black_box(SymptomReport::new(true, true))))
    });

    c.bench_function("evaluate_mixed_symptoms", |b| {
        b.iter(|| evaluate(black_box(SymptomReport::new(true, false))))
    });
}

criterion_group!(benches, bench_diagnose);
criterion_main!(benches);
