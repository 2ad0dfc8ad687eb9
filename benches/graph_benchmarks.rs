use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use gremlite::graph::{
    EdgeRecord, GraphStore, PropertyMap, PropertyValue, VertexRecord, VertexSelector,
};

/// Benchmark vertex insertion throughput
fn bench_vertex_insertion(c: &mut Criterion) {
    let mut group = c.benchmark_group("vertex_insertion");

    for size in [100, 1000, 10_000].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, &size| {
            b.iter(|| {
                let mut store = GraphStore::new();
                for i in 0..size {
                    store
                        .add_vertex(
                            VertexRecord::new()
                                .property("name", format!("Person{}", i))
                                .property("age", (i % 100) as i64),
                        )
                        .unwrap();
                }
            });
        });
    }
    group.finish();
}

/// Benchmark property selector scan performance
fn bench_property_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("property_scan");

    for size in [100, 1000, 10_000].iter() {
        // Setup: half the vertices match the selector, half are noise
        let mut store = GraphStore::new();
        for i in 0..*size {
            store
                .add_vertex(
                    VertexRecord::new()
                        .property("name", format!("Person{}", i))
                        .property("species", if i % 2 == 0 { "Aesir" } else { "Vanir" }),
                )
                .unwrap();
        }

        let mut props = PropertyMap::new();
        props.insert("species".to_string(), PropertyValue::from("Aesir"));
        let selector = VertexSelector::Props(props);

        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| {
                let matches = store.find_vertices(&selector);
                criterion::black_box(matches.len());
            });
        });
    }
    group.finish();
}

/// Benchmark multi-hop traversal latency
fn bench_traversal(c: &mut Criterion) {
    let mut group = c.benchmark_group("traversal");

    // Create a chain: v0 -> v1 -> v2 -> ... -> v99
    let mut store = GraphStore::new();
    for i in 0..100 {
        store
            .add_vertex(VertexRecord::with_id(i as i64).property("depth", i as i64))
            .unwrap();
    }
    for i in 0..99 {
        store
            .add_edge(EdgeRecord::new(i as i64, (i + 1) as i64).label("knows"))
            .unwrap();
    }

    // 1-hop traversal
    group.bench_function("1_hop", |b| {
        b.iter(|| {
            let count = store.start_at(()).out("knows").run().count();
            criterion::black_box(count);
        });
    });

    // 2-hop traversal
    group.bench_function("2_hop", |b| {
        b.iter(|| {
            let count = store.start_at(()).out("knows").out("knows").run().count();
            criterion::black_box(count);
        });
    });

    group.finish();
}

/// Benchmark filtering speed over a 1000-vertex scan
fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("filter");

    let mut store = GraphStore::new();
    for i in 0..1000 {
        store
            .add_vertex(
                VertexRecord::new()
                    .property("name", format!("Person{}", i))
                    .property("age", (i % 100) as i64)
                    .property("active", i % 2 == 0),
            )
            .unwrap();
    }

    group.bench_function("props", |b| {
        let mut props = PropertyMap::new();
        props.insert("age".to_string(), PropertyValue::from(25i64));
        b.iter(|| {
            let count = store.start_at(()).filter(props.clone()).run().count();
            criterion::black_box(count);
        });
    });

    group.bench_function("predicate", |b| {
        b.iter(|| {
            let count = store
                .start_at(())
                .filter_with(|vertex, _| {
                    vertex
                        .property("age")
                        .and_then(PropertyValue::as_integer)
                        .map_or(false, |age| age > 50)
                })
                .run()
                .count();
            criterion::black_box(count);
        });
    });

    group.bench_function("take_10", |b| {
        b.iter(|| {
            let count = store.start_at(()).take(10).run().count();
            criterion::black_box(count);
        });
    });

    group.finish();
}

/// Benchmark query construction without running it
fn bench_program_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("program_build");

    let store = GraphStore::new();

    group.bench_function("five_steps", |b| {
        b.iter(|| {
            let query = store
                .start_at(())
                .out("knows")
                .unique()
                .property("name")
                .take(10);
            criterion::black_box(query.program().len());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_vertex_insertion,
    bench_property_scan,
    bench_traversal,
    bench_filter,
    bench_program_build,
);
criterion_main!(benches);
