// Benchmark inspired by https://github.com/tikv/rust-prometheus/blob/ab1ca7285d3463504381a5025ae1951e020d6796/benches/text_encoder.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prometheus_exposition::encoding::text::TextEncoder;
use prometheus_exposition::encoding::Encoder;
use prometheus_exposition::label::LabelSet;
use prometheus_exposition::metrics::counter::Counter;
use prometheus_exposition::metrics::summary::Summary;
use prometheus_exposition::registry::Registry;

pub fn text(c: &mut Criterion) {
    c.bench_function("encode", |b| {
        let registry = Registry::default();

        for i in 0..100 {
            let counter = Counter::new(format!("my_counter_{i}"), "My counter", [("app", "bench")])
                .unwrap();
            let summary = Summary::new(format!("my_summary_{i}"), "My summary", [("app", "bench")])
                .unwrap();

            registry.register(counter.clone()).unwrap();
            registry.register(summary.clone()).unwrap();

            for j in 0u32..100 {
                let labels = LabelSet::from([("method", "GET"), ("status", "200")])
                    .with("some_number", j);
                counter.inc(&labels).unwrap();
                summary.add(&labels, j).unwrap();
            }
        }

        let encoder = TextEncoder::default();
        b.iter(|| {
            let encoded = encoder.marshall(&registry).unwrap();
            black_box(encoded);
        })
    });
}

criterion_group!(benches, text);
criterion_main!(benches);
