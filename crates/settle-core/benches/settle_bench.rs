use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use settle_core::{Entity, EntityValue, merge_deep, prorate};
use std::time::Duration;

fn generate_order(line_count: usize, reversed: bool, with_sales: bool) -> EntityValue {
    let mut ids: Vec<i64> = (0..line_count as i64).collect();
    if reversed {
        ids.reverse();
    }
    let lines = ids
        .into_iter()
        .map(|id| {
            let line = Entity::new().with("id", id).with("quantity", id % 5 + 1);
            let line = if with_sales {
                line.with(
                    "sales",
                    EntityValue::Array(vec![EntityValue::Object(
                        Entity::new().with("id", format!("sale-{id}")),
                    )]),
                )
            } else {
                line.with("productVariant", Entity::new().with("id", format!("variant-{id}")))
            };
            EntityValue::Object(line)
        })
        .collect();
    EntityValue::Object(Entity::new().with("id", "order").with("lines", EntityValue::Array(lines)))
}

fn bench_prorate(c: &mut Criterion) {
    let mut group = c.benchmark_group("prorate");
    group.measurement_time(Duration::from_secs(5));

    for size in [10, 100, 1_000].iter() {
        let weights: Vec<f64> = (0..*size).map(|i| f64::from(i % 97 + 1) * 13.0).collect();
        group.bench_with_input(BenchmarkId::new("buckets", size), &weights, |b, weights| {
            b.iter(|| black_box(prorate(weights, black_box(1_000_003))));
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge_deep");
    group.measurement_time(Duration::from_secs(5));

    for size in [10, 100, 1_000].iter() {
        group.bench_with_input(BenchmarkId::new("reordered_lines", size), size, |b, &size| {
            b.iter_batched(
                || (generate_order(size, false, true), generate_order(size, true, false)),
                |(existing, incoming)| black_box(merge_deep(Some(existing), incoming)),
                criterion::BatchSize::LargeInput,
            );
        });
    }
    group.finish();
}

criterion_group!(benches, bench_prorate, bench_merge);
criterion_main!(benches);
