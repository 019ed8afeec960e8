use prometheus_exposition::collector::Collector;
use prometheus_exposition::encoding::protobuf::client_model::MetricFamily;
use prometheus_exposition::encoding::protobuf::{ProtobufEncoder, ProtobufTextEncoder};
use prometheus_exposition::encoding::text::TextEncoder;
use prometheus_exposition::encoding::{Encoder, Format};
use prometheus_exposition::exposition::render;
use prometheus_exposition::label::LabelSet;
use prometheus_exposition::metrics::counter::Counter;
use prometheus_exposition::metrics::gauge::Gauge;
use prometheus_exposition::metrics::quantile::Estimator;
use prometheus_exposition::metrics::summary::Summary;
use prometheus_exposition::negotiator::negotiate;
use prometheus_exposition::registry::Registry;
use prometheus_exposition::Error;
use prost::Message;

/// Answers `q * 100` for every quantile it was configured with and NaN for
/// anything else, so the reported values show which estimator produced them.
#[derive(Debug)]
struct Percent {
    quantiles: Vec<f64>,
    sum: f64,
    count: u64,
}

impl Estimator for Percent {
    fn observe(&mut self, v: f64) {
        self.sum += v;
        self.count += 1;
    }

    fn query(&self, q: f64) -> f64 {
        if self.quantiles.contains(&q) {
            q * 100.0
        } else {
            f64::NAN
        }
    }

    fn sum(&self) -> f64 {
        self.sum
    }

    fn count(&self) -> u64 {
        self.count
    }
}

#[test]
fn counter_in_registry() {
    let registry = Registry::default();
    let counter = Counter::new("test_counter", "Test Counter.", [("test", "test_counter")]).unwrap();
    registry.register(counter.clone()).unwrap();

    counter.set(&LabelSet::from([("data", 1)]), 100.0).unwrap();
    counter.set(&LabelSet::from([("data", "2")]), 200.0).unwrap();
    counter.set(&LabelSet::from([("data", 1)]), 400.0).unwrap();

    assert_eq!(
        Some(400.0),
        counter.get(&LabelSet::from([("data", "1")])).unwrap()
    );

    let expected = "# HELP test_counter Test Counter.\n\
                    # TYPE test_counter counter\n\
                    test_counter{data=\"1\",test=\"test_counter\"} 400\n\
                    test_counter{data=\"2\",test=\"test_counter\"} 200\n";
    let encoded = TextEncoder::default().marshall(&registry).unwrap();
    assert_eq!(expected, String::from_utf8(encoded).unwrap());
}

#[test]
fn label_order_does_not_matter() {
    let gauge = Gauge::new("g", "A gauge.", LabelSet::new()).unwrap();
    let forward = LabelSet::from([("a", "1"), ("b", "2"), ("c", "3")]);
    let backward = LabelSet::from([("c", "3"), ("b", "2"), ("a", "1")]);

    gauge.set(&forward, 1.0).unwrap();
    gauge.add(&backward, 2.0).unwrap();

    assert_eq!(1, gauge.len());
    assert_eq!(Some(3.0), gauge.get(&forward).unwrap());
}

#[test]
fn injected_estimator_answers_queries() {
    let summary = Summary::with_quantiles(
        "request_size_bytes",
        "Request size.",
        LabelSet::new(),
        [0.25, 0.75],
    )
    .unwrap()
    .with_estimator(|quantiles: &[f64]| -> Box<dyn Estimator> {
        Box::new(Percent {
            quantiles: quantiles.to_vec(),
            sum: 0.0,
            count: 0,
        })
    });
    let registry = Registry::default();
    registry.register(summary.clone()).unwrap();

    let labels = LabelSet::from([("handler", "/upload")]);
    for v in [1.0, 2.0, 3.0] {
        summary.add(&labels, v).unwrap();
    }

    let snapshot = summary.get(&labels).unwrap().unwrap();
    assert_eq!(vec![(0.25, 25.0), (0.75, 75.0)], snapshot.quantiles);
    assert_eq!(6.0, snapshot.sum);
    assert_eq!(3, snapshot.count);

    let text = String::from_utf8(TextEncoder::default().marshall(&registry).unwrap()).unwrap();
    assert!(text.contains("request_size_bytes{handler=\"/upload\",quantile=\"0.25\"} 25\n"));
    assert!(text.contains("request_size_bytes{handler=\"/upload\",quantile=\"0.75\"} 75\n"));
    assert!(text.contains("request_size_bytes_sum{handler=\"/upload\"} 6\n"));
}

#[test]
fn invalid_mutations_leave_no_trace() {
    let registry = Registry::default();
    let counter = Counter::new("c", "A counter.", LabelSet::new()).unwrap();
    registry.register(counter.clone()).unwrap();

    assert!(matches!(
        counter.add(&LabelSet::EMPTY, -1.0),
        Err(Error::Range(_))
    ));
    assert!(matches!(
        counter.inc(&LabelSet::from([("__name__", "x")])),
        Err(Error::Label(_))
    ));
    assert!(matches!(
        registry.register(Gauge::new("c", "Other.", LabelSet::new()).unwrap()),
        Err(Error::NameCollision(_))
    ));

    assert!(counter.is_empty());
    let encoded = TextEncoder::default().marshall(&registry).unwrap();
    assert_eq!(
        "# HELP c A counter.\n# TYPE c counter\n",
        String::from_utf8(encoded).unwrap()
    );
}

#[test]
fn every_format_renders_every_collector() {
    let registry = Registry::default();
    let counter = Counter::new("requests_total", "Requests.", [("app", "api")]).unwrap();
    let gauge = Gauge::new("in_flight", "In flight requests.", [("app", "api")]).unwrap();
    let summary = Summary::new("latency_seconds", "Latency.", [("app", "api")]).unwrap();
    registry.register(counter.clone()).unwrap();
    registry.register(gauge.clone()).unwrap();
    registry.register(summary.clone()).unwrap();

    let labels = LabelSet::from([("route", "/")]);
    counter.inc(&labels).unwrap();
    gauge.set(&labels, 3.0).unwrap();
    summary.add(&labels, 0.25).unwrap();

    let text = String::from_utf8(TextEncoder::default().marshall(&registry).unwrap()).unwrap();
    assert!(text.contains("requests_total{app=\"api\",route=\"/\"} 1\n"));
    assert!(text.contains("in_flight{app=\"api\",route=\"/\"} 3\n"));
    assert!(text.contains("latency_seconds{app=\"api\",quantile=\"0.5\",route=\"/\"} 0.25\n"));
    assert!(text.contains("latency_seconds_count{app=\"api\",route=\"/\"} 1\n"));

    let binary = ProtobufEncoder::default().marshall(&registry).unwrap();
    let mut buf = binary.as_slice();
    let mut names = Vec::new();
    while !buf.is_empty() {
        let family = MetricFamily::decode_length_delimited(&mut buf).unwrap();
        names.push(family.name.unwrap());
    }
    assert_eq!(vec!["in_flight", "latency_seconds", "requests_total"], names);

    let debug = ProtobufTextEncoder::default().marshall(&registry).unwrap();
    let debug = String::from_utf8(debug).unwrap();
    assert!(debug.contains("type: SUMMARY\n"));
    assert!(debug.contains("  summary {\n    sample_count: 1\n    sample_sum: 0.25\n"));
}

#[test]
fn negotiated_encoders() {
    let registry = Registry::default();
    let counter = Counter::new("c", "A counter.", LabelSet::new()).unwrap();
    counter.inc(&LabelSet::EMPTY).unwrap();
    registry.register(counter.clone()).unwrap();

    let protobuf = [(
        "ACCEPT",
        "encoding=delimited;application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily",
    )];
    assert_eq!(Format::Protobuf, negotiate(protobuf));

    let exposition = render(&registry, protobuf).unwrap();
    assert_eq!(
        ProtobufEncoder::default()
            .marshall_collector(&Collector::from(counter))
            .unwrap(),
        exposition.body
    );

    let exposition = render(&registry, [("Accept", "text/plain; version=0.0.4")]).unwrap();
    assert_eq!(Format::Text.content_type(), exposition.content_type);
    assert_eq!(
        "# HELP c A counter.\n# TYPE c counter\nc 1\n",
        String::from_utf8(exposition.body).unwrap()
    );
}

#[test]
fn concurrent_writers_and_scrapes() {
    let registry = Registry::default();
    let counter = Counter::new("hits_total", "Hits.", LabelSet::new()).unwrap();
    registry.register(counter.clone()).unwrap();

    let writers: Vec<_> = (0..4)
        .map(|i| {
            let counter = counter.clone();
            std::thread::spawn(move || {
                let labels = LabelSet::from([("worker", i)]);
                for _ in 0..500 {
                    counter.inc(&labels).unwrap();
                }
            })
        })
        .collect();

    let scraper = {
        let registry = registry.clone();
        std::thread::spawn(move || {
            for _ in 0..50 {
                let encoded = TextEncoder::default().marshall(&registry).unwrap();
                assert!(String::from_utf8(encoded).is_ok());
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    scraper.join().unwrap();

    let total: f64 = counter.get_all().iter().map(|(_, v)| v).sum();
    assert_eq!(2000.0, total);
}
