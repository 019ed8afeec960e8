//! Pushes a gauge to a Pushgateway every two seconds.
//!
//! Start a gateway first, e.g. `docker run -p 9091:9091 prom/pushgateway`,
//! then run with `RUST_LOG=debug` to see every request.

use prometheus_exposition::{
    label::LabelSet,
    metrics::gauge::Gauge,
    push::{PushConfig, Pusher},
    registry::Registry,
};
use std::{thread, time::Duration};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let gateway =
        std::env::var("PUSHGATEWAY_URL").unwrap_or_else(|_| "http://127.0.0.1:9091".to_owned());
    let config = PushConfig::new(gateway, "pushgateway_example")
        .with_instance("demo")
        .with_timeout(Duration::from_secs(5));
    let pusher = Pusher::new(config).unwrap();

    let gauge = Gauge::new(
        "up_and_down",
        "A gauge that goes up and down.",
        [("source", "demo")],
    )
    .unwrap();
    let registry = Registry::default();
    registry.register(gauge.clone()).unwrap();

    let labels = LabelSet::from([("direction", "oscillating")]);
    for i in 0..10 {
        if i % 2 == 0 {
            gauge.add(&labels, 10.0).unwrap();
        } else {
            gauge.sub(&labels, 5.0).unwrap();
        }

        if let Err(e) = pusher.add(&registry) {
            eprintln!("push failed: {e}");
        }
        thread::sleep(Duration::from_secs(2));
    }

    pusher.delete(&registry).unwrap();
}
