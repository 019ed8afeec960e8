// Benchmark inspired by https://github.com/tikv/rust-prometheus/blob/ab1ca7285d3463504381a5025ae1951e020d6796/benches/text_encoder.rs

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use prometheus_exposition::encoding::protobuf::ProtobufEncoder;
use prometheus_exposition::encoding::Encoder;
use prometheus_exposition::label::LabelSet;
use prometheus_exposition::metrics::counter::Counter;
use prometheus_exposition::metrics::gauge::Gauge;
use prometheus_exposition::registry::Registry;

pub fn proto(c: &mut Criterion) {
    c.bench_function("encode", |b| {
        let registry = Registry::default();

        for i in 0..100 {
            let counter = Counter::new(format!("my_counter_{i}"), "My counter", LabelSet::new())
                .unwrap();
            let gauge = Gauge::new(format!("my_gauge_{i}"), "My gauge", LabelSet::new()).unwrap();

            registry.register(counter.clone()).unwrap();
            registry.register(gauge.clone()).unwrap();

            for j in 0u32..100 {
                let labels = LabelSet::from([("path", format!("/path/{i}")), ("method", "GET".to_owned())])
                    .with("some_number", j);
                counter.inc(&labels).unwrap();
                gauge.set(&labels, f64::from(j)).unwrap();
            }
        }

        let encoder = ProtobufEncoder::default();
        b.iter(|| {
            let encoded = encoder.marshall(&registry).unwrap();
            black_box(encoded);
        })
    });
}

criterion_group!(benches, proto);
criterion_main!(benches);
