//! Prometheus protobuf exposition format.
//!
//! [`ProtobufEncoder`] writes length delimited `io.prometheus.client.MetricFamily`
//! messages, one per collector. [`ProtobufTextEncoder`] writes the same
//! messages in protobuf text format, which is meant for debugging.
//!
//! ```
//! # use prometheus_exposition::encoding::protobuf::ProtobufEncoder;
//! # use prometheus_exposition::label::LabelSet;
//! # use prometheus_exposition::metrics::counter::Counter;
//! #
//! let counter = Counter::new("my_counter", "This is my counter.", LabelSet::new()).unwrap();
//! counter.inc(&LabelSet::EMPTY).unwrap();
//!
//! let family = ProtobufEncoder::default().metric_family(&counter.into());
//! assert_eq!(Some("my_counter"), family.name.as_deref());
//! assert_eq!(Some(1.0), family.metric[0].counter.as_ref().and_then(|c| c.value));
//! ```

// Messages are hand written prost definitions of the upstream proto file.
#[allow(missing_docs, clippy::derive_partial_eq_without_eq)]
pub mod client_model;

use prost::Message;

use self::client_model::{LabelPair, MetricFamily};
use super::{timestamp_ms, write_f64, Encoder};
use crate::collector::{Collector, Descriptor};
use crate::error::Result;
use crate::label::LabelSet;
use crate::metrics::summary::SummarySnapshot;
use crate::metrics::MetricType;
use crate::registry::Registry;

/// Media type of the binary protobuf format.
pub const CONTENT_TYPE: &str =
    "application/vnd.google.protobuf; proto=io.prometheus.client.MetricFamily; encoding=delimited";

/// Media type of the protobuf text format.
pub const TEXT_CONTENT_TYPE: &str =
    "application/vnd.google.protobuf; proto=io.prometheus.client.MetricFamily; encoding=text";

/// Encoder for length delimited protobuf messages.
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtobufEncoder {
    timestamp: bool,
}

impl ProtobufEncoder {
    /// Creates a [`ProtobufEncoder`] without timestamps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `timestamp_ms` on every metric to the current time.
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The [`MetricFamily`] message describing `collector`.
    pub fn metric_family(&self, collector: &Collector) -> MetricFamily {
        family(collector, self.timestamp.then(timestamp_ms))
    }

    fn families(&self, registry: &Registry) -> Vec<MetricFamily> {
        let timestamp = self.timestamp.then(timestamp_ms);
        registry
            .get_all()
            .iter()
            .map(|collector| family(collector, timestamp))
            .collect()
    }
}

impl Encoder for ProtobufEncoder {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    fn marshall_collector(&self, collector: &Collector) -> Result<Vec<u8>> {
        Ok(self.metric_family(collector).encode_length_delimited_to_vec())
    }

    fn marshall(&self, registry: &Registry) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        for family in self.families(registry) {
            family.encode_length_delimited(&mut buf)?;
        }
        Ok(buf)
    }
}

impl From<MetricType> for client_model::MetricType {
    fn from(m: MetricType) -> Self {
        match m {
            MetricType::Counter => client_model::MetricType::Counter,
            MetricType::Gauge => client_model::MetricType::Gauge,
            MetricType::Summary => client_model::MetricType::Summary,
        }
    }
}

fn family(collector: &Collector, timestamp: Option<i64>) -> MetricFamily {
    let desc = collector.descriptor();

    let metric = match collector {
        Collector::Counter(counter) => counter
            .get_all()
            .into_iter()
            .map(|(labels, value)| client_model::Metric {
                label: label_pairs(desc, &labels),
                counter: Some(client_model::Counter { value: Some(value) }),
                timestamp_ms: timestamp,
                ..Default::default()
            })
            .collect(),
        Collector::Gauge(gauge) => gauge
            .get_all()
            .into_iter()
            .map(|(labels, value)| client_model::Metric {
                label: label_pairs(desc, &labels),
                gauge: Some(client_model::Gauge { value: Some(value) }),
                timestamp_ms: timestamp,
                ..Default::default()
            })
            .collect(),
        Collector::Summary(summary) => summary
            .get_all()
            .into_iter()
            .map(|(labels, snapshot)| client_model::Metric {
                label: label_pairs(desc, &labels),
                summary: Some(summary_message(&snapshot)),
                timestamp_ms: timestamp,
                ..Default::default()
            })
            .collect(),
    };

    let metric_type: client_model::MetricType = collector.metric_type().into();
    MetricFamily {
        name: Some(desc.name().to_owned()),
        help: Some(desc.help().to_owned()),
        r#type: Some(metric_type as i32),
        metric,
    }
}

fn label_pairs(desc: &Descriptor, labels: &LabelSet) -> Vec<LabelPair> {
    desc.const_labels()
        .merge(labels)
        .into_iter()
        .map(|(name, value)| LabelPair {
            name: Some(name),
            value: Some(value),
        })
        .collect()
}

fn summary_message(snapshot: &SummarySnapshot) -> client_model::Summary {
    client_model::Summary {
        sample_count: Some(snapshot.count),
        sample_sum: Some(snapshot.sum),
        quantile: snapshot
            .quantiles
            .iter()
            .map(|(quantile, value)| client_model::Quantile {
                quantile: Some(*quantile),
                value: Some(*value),
            })
            .collect(),
    }
}

/// Encoder for the protobuf text format.
///
/// ```
/// # use prometheus_exposition::encoding::protobuf::ProtobufTextEncoder;
/// # use prometheus_exposition::encoding::Encoder;
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::gauge::Gauge;
/// #
/// let gauge = Gauge::new("queue_depth", "Items waiting.", LabelSet::new()).unwrap();
/// gauge.set(&LabelSet::from([("queue", "mail")]), 3.0).unwrap();
///
/// let encoded = ProtobufTextEncoder::default().marshall_collector(&gauge.into()).unwrap();
/// let expected = r#"name: "queue_depth"
/// help: "Items waiting."
/// type: GAUGE
/// metric {
///   label {
///     name: "queue"
///     value: "mail"
///   }
///   gauge {
///     value: 3
///   }
/// }
/// "#;
/// assert_eq!(expected, String::from_utf8(encoded).unwrap());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ProtobufTextEncoder {
    inner: ProtobufEncoder,
}

impl ProtobufTextEncoder {
    /// Creates a [`ProtobufTextEncoder`] without timestamps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write `timestamp_ms` on every metric, set to the current time.
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.inner = self.inner.with_timestamp(timestamp);
        self
    }
}

impl Encoder for ProtobufTextEncoder {
    fn content_type(&self) -> &'static str {
        TEXT_CONTENT_TYPE
    }

    fn marshall_collector(&self, collector: &Collector) -> Result<Vec<u8>> {
        let mut printer = TextPrinter::default();
        printer.family(&self.inner.metric_family(collector));
        Ok(printer.out.into_bytes())
    }

    fn marshall(&self, registry: &Registry) -> Result<Vec<u8>> {
        let mut printer = TextPrinter::default();
        for family in self.inner.families(registry) {
            printer.family(&family);
        }
        Ok(printer.out.into_bytes())
    }
}

/// Writes messages in protobuf text format. Unset optional fields are
/// skipped.
#[derive(Default)]
struct TextPrinter {
    out: String,
    depth: usize,
}

impl TextPrinter {
    fn family(&mut self, family: &MetricFamily) {
        self.string("name", family.name.as_deref());
        self.string("help", family.help.as_deref());
        if let Some(t) = family.r#type {
            match client_model::MetricType::try_from(t) {
                Ok(t) => self.raw("type", t.as_str_name()),
                Err(_) => self.raw("type", itoa::Buffer::new().format(t)),
            }
        }
        for metric in &family.metric {
            self.open("metric");
            self.metric(metric);
            self.close();
        }
    }

    fn metric(&mut self, metric: &client_model::Metric) {
        for label in &metric.label {
            self.open("label");
            self.string("name", label.name.as_deref());
            self.string("value", label.value.as_deref());
            self.close();
        }
        if let Some(gauge) = &metric.gauge {
            self.open("gauge");
            self.double("value", gauge.value);
            self.close();
        }
        if let Some(counter) = &metric.counter {
            self.open("counter");
            self.double("value", counter.value);
            self.close();
        }
        if let Some(summary) = &metric.summary {
            self.open("summary");
            if let Some(count) = summary.sample_count {
                self.raw("sample_count", itoa::Buffer::new().format(count));
            }
            self.double("sample_sum", summary.sample_sum);
            for quantile in &summary.quantile {
                self.open("quantile");
                self.double("quantile", quantile.quantile);
                self.double("value", quantile.value);
                self.close();
            }
            self.close();
        }
        if let Some(timestamp) = metric.timestamp_ms {
            self.raw("timestamp_ms", itoa::Buffer::new().format(timestamp));
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.out.push_str("  ");
        }
    }

    fn open(&mut self, field: &str) {
        self.indent();
        self.out.push_str(field);
        self.out.push_str(" {\n");
        self.depth += 1;
    }

    fn close(&mut self) {
        self.depth -= 1;
        self.indent();
        self.out.push_str("}\n");
    }

    fn raw(&mut self, field: &str, value: &str) {
        self.indent();
        self.out.push_str(field);
        self.out.push_str(": ");
        self.out.push_str(value);
        self.out.push('\n');
    }

    fn double(&mut self, field: &str, value: Option<f64>) {
        if let Some(value) = value {
            self.indent();
            self.out.push_str(field);
            self.out.push_str(": ");
            write_f64(&mut self.out, value);
            self.out.push('\n');
        }
    }

    fn string(&mut self, field: &str, value: Option<&str>) {
        let Some(value) = value else {
            return;
        };
        self.indent();
        self.out.push_str(field);
        self.out.push_str(": \"");
        for c in value.chars() {
            match c {
                '\\' => self.out.push_str("\\\\"),
                '"' => self.out.push_str("\\\""),
                '\'' => self.out.push_str("\\'"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                c if (c as u32) < 0x20 || c == '\x7f' => {
                    self.out.push_str(&format!("\\{:03o}", c as u32));
                }
                c => self.out.push(c),
            }
        }
        self.out.push_str("\"\n");
    }
}
