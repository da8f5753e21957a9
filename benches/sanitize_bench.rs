/// Sanitizer and rule-set benchmarks
/// Measures request cleaning cost for typical and worst-case payloads
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Map, Value};
use std::hint::black_box;
use std::time::Duration;

use roomielab_api::api::middleware::input_sanitization::{
    rule_sets::{DESIGN_CREATE, PROJECT_CREATE},
    SanitizationConfig, Sanitizer,
};
use roomielab_api::{is_safe_url, sanitize_string};

fn canvas(objects: usize) -> Value {
    let mut layers = Map::new();
    for i in 0..objects {
        layers.insert(
            format!("layer_{}", i),
            json!({
                "label": format!("<b>Layer {}</b>", i),
                "position": {"x": i, "y": 0, "z": i * 2},
                "tags": ["wood", "oak", "<script>x</script>"],
            }),
        );
    }
    Value::Object(layers)
}

fn string_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("sanitize_string");
    group.measurement_time(Duration::from_secs(5));

    let inputs = [
        ("plain", "Cozy living room with a reading corner".to_string()),
        ("markup", "<p>Cozy <b>living</b> room</p><script>alert(1)</script>".repeat(10)),
        ("oversized", "x".repeat(10_000)),
    ];
    for (name, input) in inputs.iter() {
        group.throughput(Throughput::Bytes(input.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(name), input, |b, s| {
            b.iter(|| sanitize_string(black_box(s)))
        });
    }
    group.finish();
}

fn object_benchmarks(c: &mut Criterion) {
    let config = SanitizationConfig::default();
    let mut group = c.benchmark_group("sanitize_object");

    for objects in [10, 100, 1000].iter() {
        let value = canvas(*objects);
        group.throughput(Throughput::Bytes(Sanitizer::serialized_size(&value) as u64));
        group.bench_with_input(BenchmarkId::new("canvas", objects), &value, |b, v| {
            b.iter(|| Sanitizer::sanitize_object(black_box(v), &config))
        });
    }
    group.finish();
}

fn rule_set_benchmarks(c: &mut Criterion) {
    let config = SanitizationConfig::default();
    let mut group = c.benchmark_group("rule_sets");

    let project = json!({
        "name": "  <i>Loft</i> renovation ",
        "description": "Open plan with a mezzanine",
        "roomType": "living_room",
        "tags": ["industrial", "", "<b>brick</b>"],
        "isPublic": false,
    });
    group.bench_function("project_create", |b| {
        b.iter(|| PROJECT_CREATE.evaluate(black_box(&project), &config))
    });

    let design = json!({
        "projectId": "3f2a9c1e0b7d4e5f8a6b2c1d0e9f8a7b",
        "name": "First pass",
        "canvasData": canvas(100),
        "imageUrl": "https://cdn.example.com/designs/first.png",
    });
    group.bench_function("design_create", |b| {
        b.iter(|| DESIGN_CREATE.evaluate(black_box(&design), &config))
    });
    group.finish();
}

fn url_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("is_safe_url");
    for url in [
        "https://cdn.example.com/models/chair.glb",
        "http://10.0.0.4/admin",
        "javascript:alert(1)",
    ]
    .iter()
    {
        group.bench_with_input(BenchmarkId::from_parameter(url), url, |b, u| {
            b.iter(|| is_safe_url(black_box(u), true))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    string_benchmarks,
    object_benchmarks,
    rule_set_benchmarks,
    url_benchmarks
);
criterion_main!(benches);
