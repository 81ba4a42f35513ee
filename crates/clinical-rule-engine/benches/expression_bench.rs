//! 表达式引擎与事件解析性能基准测试

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_engine::{
    Catalog, CatalogCompiler, EventResolver, Message, RuleResults, convert_and_evaluate, to_postfix,
    tokenize, ventilator_catalog,
};
use std::hint::black_box;
use std::sync::Arc;

/// 生成 `n` 个操作数交替使用 `&`/`|` 的表达式
fn create_chain(n: usize) -> String {
    (0..n)
        .map(|i| if i % 3 == 0 { "false" } else { "true" })
        .enumerate()
        .fold(String::new(), |mut acc, (i, value)| {
            if i > 0 {
                acc.push_str(if i % 2 == 0 { " & " } else { " | " });
            }
            acc.push_str(value);
            acc
        })
}

fn create_message() -> Message {
    Message::new()
        .with_alarm("CO2lo", "1")
        .with_alarm("HRlo", "1")
        .with_measurement("HR", "72")
        .with_measurement("SPO2", "96")
        .with_measurement("SFRatio", "150")
        .with_measurement("OSI", "8.2")
}

fn default_catalog() -> Arc<Catalog> {
    match CatalogCompiler::new().compile(ventilator_catalog()) {
        Ok(catalog) => Arc::new(catalog),
        Err(e) => panic!("built-in catalog must compile: {}", e),
    }
}

/// 各阶段基准
fn bench_expression_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_stages");
    let infix = "true & (false | true) & (true | false & true)";

    group.bench_function("tokenize", |b| {
        b.iter(|| tokenize(black_box(infix)).count())
    });

    group.bench_function("to_postfix", |b| {
        b.iter(|| to_postfix(tokenize(black_box(infix))).count())
    });

    group.bench_function("convert_and_evaluate", |b| {
        b.iter(|| convert_and_evaluate(black_box(infix)))
    });

    group.finish();
}

/// 表达式长度扩展性
fn bench_expression_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("expression_scaling");

    for size in [4, 16, 64, 256].iter() {
        let infix = create_chain(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| convert_and_evaluate(black_box(&infix)))
        });
    }

    group.finish();
}

/// 规则结果替换
fn bench_substitution(c: &mut Criterion) {
    let results: RuleResults = (1..=99).map(|id| (id, id % 2 == 0)).collect();

    c.bench_function("substitute_condition", |b| {
        b.iter(|| results.substitute(black_box("4 & 5 & (2 | 3) | 22 & 99")))
    });
}

/// 完整评估周期
fn bench_resolve(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolve");
    let message = create_message();

    let resolver = EventResolver::new(default_catalog());
    group.bench_function("ventilator_catalog", |b| {
        b.iter(|| resolver.resolve(black_box(&message)))
    });

    let traced = EventResolver::new(default_catalog()).with_trace();
    group.bench_function("ventilator_catalog_traced", |b| {
        b.iter(|| traced.resolve(black_box(&message)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_expression_stages,
    bench_expression_scaling,
    bench_substitution,
    bench_resolve,
);
criterion_main!(benches);
