#![deny(dead_code)]
#![deny(missing_docs)]
#![deny(unused)]
#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

//! Client library for instrumenting applications with
//! [Prometheus](https://prometheus.io/) metrics.
//!
//! Counters, gauges and summaries keep one value per label combination.
//! They are registered with a [`Registry`](registry::Registry), which is
//! rendered in the text exposition format or as protobuf `MetricFamily`
//! messages, either served on `GET /metrics` or pushed to a Pushgateway.
//!
//! # Examples
//!
//! ```
//! use prometheus_exposition::encoding::text::TextEncoder;
//! use prometheus_exposition::encoding::Encoder;
//! use prometheus_exposition::label::LabelSet;
//! use prometheus_exposition::metrics::counter::Counter;
//! use prometheus_exposition::registry::Registry;
//!
//! // Create a metric registry.
//! let registry = Registry::default();
//!
//! // Create a counter with a constant label, attached to every sample.
//! let http_requests = Counter::new(
//!     "http_requests_total",
//!     "Number of HTTP requests received.",
//!     [("app", "web")],
//! ).unwrap();
//!
//! // Register the counter with the registry. Handles are shared, so the
//! // clone kept here updates what the registry renders.
//! registry.register(http_requests.clone()).unwrap();
//!
//! // Somewhere in your business logic record a single HTTP GET request.
//! let labels = LabelSet::from([("method", "GET"), ("path", "/metrics")]);
//! http_requests.inc(&labels).unwrap();
//!
//! // When a monitoring system like Prometheus scrapes the local node, encode
//! // all metrics in the registry and send the encoded metrics back.
//! let buffer = TextEncoder::default().marshall(&registry).unwrap();
//!
//! let expected = "# HELP http_requests_total Number of HTTP requests received.\n".to_owned() +
//!                "# TYPE http_requests_total counter\n" +
//!                "http_requests_total{app=\"web\",method=\"GET\",path=\"/metrics\"} 1\n";
//! assert_eq!(expected, String::from_utf8(buffer).unwrap());
//! ```
//! See the `demos` directory for an HTTP server and a Pushgateway client.

pub mod collector;
pub mod encoding;
pub mod error;
pub mod exposition;
pub mod label;
pub mod metrics;
pub mod negotiator;
pub mod push;
pub mod registry;

pub use error::{Error, Result};
