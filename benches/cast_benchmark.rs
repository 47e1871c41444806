use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::json;

use pivotdb::aggregate::Aggregate;
use pivotdb::cast::cast;
use pivotdb::collection::Collection;
use pivotdb::value::Document;

/// Helper to create a synthetic people collection
fn create_collection(size: usize) -> Collection {
    let countries = ["USA", "UK", "Finland", "Norway", "Netherlands"];
    let cities = ["Alpha", "Beta", "Gamma", "Delta"];
    let genders = ["male", "female"];

    let docs = (0..size)
        .map(|i| {
            Document::from_json(json!({
                "name": format!("person {}", i),
                "age": 20 + (i % 60) as i64,
                "gender": genders[i % genders.len()],
                "born": {
                    "country": countries[i % countries.len()],
                    "city": cities[i % cities.len()],
                },
            }))
            .unwrap()
        })
        .collect();
    Collection::new(docs)
}

/// Benchmark exact and comparison filters
fn bench_find_ids(c: &mut Criterion) {
    let collection = create_collection(1000);

    c.bench_function("find_exact", |b| {
        b.iter(|| {
            let count = collection.find("born__country", "USA").count().unwrap();
            black_box(count)
        });
    });

    c.bench_function("find_comparison", |b| {
        b.iter(|| {
            let count = collection.find("age__gt", 50).count().unwrap();
            black_box(count)
        });
    });
}

/// Benchmark cast table construction at several collection sizes
fn bench_cast(c: &mut Criterion) {
    let mut group = c.benchmark_group("cast_two_factors");
    for size in [100, 1000, 5000].iter() {
        let collection = create_collection(*size);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let table = cast(
                    &collection.all(),
                    &["born__country", "gender"],
                    &[],
                    &[Aggregate::avg("age")],
                )
                .unwrap();
                black_box(table)
            });
        });
    }
    group.finish();
}

/// Benchmark pivoting with cell rendering
fn bench_cast_pivot_render(c: &mut Criterion) {
    let collection = create_collection(1000);

    c.bench_function("cast_pivot_render", |b| {
        b.iter(|| {
            let table = cast(
                &collection.all(),
                &["born__country"],
                &["gender"],
                &[Aggregate::count(), Aggregate::avg("age")],
            )
            .unwrap();
            black_box(table.render().unwrap())
        });
    });
}

criterion_group!(benches, bench_find_ids, bench_cast, bench_cast_pivot_render);
criterion_main!(benches);
