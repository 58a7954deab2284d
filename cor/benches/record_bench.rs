//! Benchmarks for record construction.

use cor::prelude::*;
use cor::testing::VehicleFixture;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

fn record_benchmark(c: &mut Criterion) {
    let fixture = VehicleFixture::new();
    let car_data = VehicleFixture::car_data();

    c.bench_function("extensible_wheeler", |b| {
        b.iter(|| fixture.wheeler.from_fields(black_box(car_data.clone())))
    });

    let vehicle = Value::Record(
        fixture
            .wheeler
            .from_fields(car_data.clone())
            .unwrap_or_else(|err| panic!("fixture data must build: {err}")),
    );
    c.bench_function("closed_car_from_record", |b| {
        b.iter(|| fixture.car.construct(Some(black_box(&vehicle)), Fields::new()))
    });

    let point = RecordType::closed("Point")
        .field("x", to_int())
        .field("y", to_int().then(only_if(|v| v.as_int() > Some(0), "positive")))
        .field("label", skip_missing().then(to_str()))
        .build();
    let input = fields_from_json(json!({"x": "1", "y": 2, "label": 3}));
    c.bench_function("pipe_conversions", |b| {
        b.iter(|| point.from_fields(black_box(input.clone())))
    });

    let owner = RecordType::closed("Owner")
        .field("name", ValueKind::Str)
        .field("transport", subrecord(&fixture.bicycle))
        .build();
    let mut nested = fields_from_json(json!({"name": "bob"}));
    let bicycle = fixture
        .wheeler
        .from_fields(VehicleFixture::bicycle_data())
        .unwrap_or_else(|err| panic!("fixture data must build: {err}"));
    nested.insert("transport".to_string(), Value::Record(bicycle));
    c.bench_function("nested_subrecord", |b| {
        b.iter(|| owner.from_fields(black_box(nested.clone())))
    });
}

fn basic_benchmark(c: &mut Criterion) {
    let fixture = VehicleFixture::new();
    let truck = Value::Record(
        fixture
            .wheeler
            .from_fields(VehicleFixture::truck_data())
            .unwrap_or_else(|err| panic!("fixture data must build: {err}")),
    );
    let converter = BasicConverter::new();
    c.bench_function("as_basic_type", |b| b.iter(|| converter.convert(black_box(&truck))));
}

criterion_group!(benches, record_benchmark, basic_benchmark);
criterion_main!(benches);
