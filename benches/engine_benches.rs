use RustedCalc::symbolic::engine::Engine;
use criterion::{Criterion, criterion_group, criterion_main};
use std::collections::HashMap;
use std::hint::black_box;

const EXPRESSION: &str = "2(3+x)^2 - sin(x)/cos(y) + ln(x*y+1)";

/// same text every time: parsed once, then served from the tree cache
fn bench_cached_evaluation(c: &mut Criterion) {
    let engine = Engine::new();
    let bindings = HashMap::from([
        ("x".to_string(), "1.5".to_string()),
        ("y".to_string(), "0.25".to_string()),
    ]);
    c.bench_function("evaluate cached", |b| {
        b.iter(|| engine.evaluate(black_box(EXPRESSION), &bindings))
    });
}

/// a fresh engine per iteration, so every evaluation parses
fn bench_uncached_evaluation(c: &mut Criterion) {
    let bindings = HashMap::from([
        ("x".to_string(), "1.5".to_string()),
        ("y".to_string(), "0.25".to_string()),
    ]);
    c.bench_function("evaluate uncached", |b| {
        b.iter(|| Engine::new().evaluate(black_box(EXPRESSION), &bindings))
    });
}

fn bench_differentiation(c: &mut Criterion) {
    let engine = Engine::new();
    let mut group = c.benchmark_group("differentiate");
    for (name, expression) in [
        ("polynomial", "3x^4 - 2x^3 + x - 7"),
        ("trigonometric", "sin(x)*cos(x)^2 + tan(2x)"),
        ("mixed", EXPRESSION),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| engine.differentiate(black_box(expression), "x;y"))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_cached_evaluation,
    bench_uncached_evaluation,
    bench_differentiation
);
criterion_main!(benches);
