//! Prometheus text exposition format, version 0.0.4.
//!
//! ```
//! # use prometheus_exposition::encoding::text::TextEncoder;
//! # use prometheus_exposition::encoding::Encoder;
//! # use prometheus_exposition::label::LabelSet;
//! # use prometheus_exposition::metrics::counter::Counter;
//! # use prometheus_exposition::registry::Registry;
//! #
//! let registry = Registry::default();
//! let counter = Counter::new("test_counter", "Test Counter.", [("test", "test_counter")]).unwrap();
//! registry.register(counter.clone()).unwrap();
//!
//! counter.set(&LabelSet::from([("data", 1)]), 100.0).unwrap();
//! counter.set(&LabelSet::from([("data", "2")]), 200.0).unwrap();
//! counter.set(&LabelSet::from([("data", 1)]), 400.0).unwrap();
//!
//! let encoded = TextEncoder::default().marshall(&registry).unwrap();
//! let expected = "# HELP test_counter Test Counter.\n".to_owned() +
//!                "# TYPE test_counter counter\n" +
//!                "test_counter{data=\"1\",test=\"test_counter\"} 400\n" +
//!                "test_counter{data=\"2\",test=\"test_counter\"} 200\n";
//! assert_eq!(expected, String::from_utf8(encoded).unwrap());
//! ```

use super::{format_f64, timestamp_ms, Encoder};
use crate::collector::{Collector, Descriptor};
use crate::error::Result;
use crate::label::LabelSet;
use crate::metrics::summary::{SummarySnapshot, QUANTILE_LABEL};
use crate::registry::Registry;

/// Media type of the text format.
pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

/// Encoder for the text format.
///
/// Output is sorted line by line, so it does not depend on the order in which
/// samples were recorded.
#[derive(Clone, Copy, Debug, Default)]
pub struct TextEncoder {
    timestamp: bool,
}

impl TextEncoder {
    /// Creates a [`TextEncoder`] without timestamps.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the current time, in milliseconds since the Unix epoch, to
    /// every sample line.
    pub fn with_timestamp(mut self, timestamp: bool) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The sorted lines describing `collector`, headers included.
    pub fn lines(&self, collector: &Collector) -> Vec<String> {
        self.lines_at(collector, self.timestamp.then(timestamp_ms))
    }

    fn lines_at(&self, collector: &Collector, timestamp: Option<i64>) -> Vec<String> {
        let desc = collector.descriptor();

        let mut lines = vec![
            format!("# HELP {} {}", desc.name(), escape_help(desc.help())),
            format!("# TYPE {} {}", desc.name(), collector.metric_type().as_str()),
        ];

        match collector {
            Collector::Counter(counter) => {
                encode_value(&mut lines, desc, counter.get_all(), timestamp)
            }
            Collector::Gauge(gauge) => encode_value(&mut lines, desc, gauge.get_all(), timestamp),
            Collector::Summary(summary) => {
                encode_summary(&mut lines, desc, summary.get_all(), timestamp)
            }
        }

        lines.sort();
        lines
    }
}

impl Encoder for TextEncoder {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    fn marshall_collector(&self, collector: &Collector) -> Result<Vec<u8>> {
        Ok(self.lines(collector).join("\n").into_bytes())
    }

    fn marshall(&self, registry: &Registry) -> Result<Vec<u8>> {
        let timestamp = self.timestamp.then(timestamp_ms);

        let mut blocks: Vec<String> = registry
            .get_all()
            .iter()
            .map(|collector| self.lines_at(collector, timestamp).join("\n"))
            .collect();
        blocks.sort();

        let mut out = String::new();
        for block in blocks {
            out.push_str(&block);
            out.push('\n');
        }
        Ok(out.into_bytes())
    }
}

fn encode_value(
    lines: &mut Vec<String>,
    desc: &Descriptor,
    samples: Vec<(LabelSet, f64)>,
    timestamp: Option<i64>,
) {
    for (labels, value) in samples {
        let labels = desc.const_labels().merge(&labels);
        lines.push(sample_line(desc.name(), "", &labels, &format_f64(value), timestamp));
    }
}

fn encode_summary(
    lines: &mut Vec<String>,
    desc: &Descriptor,
    samples: Vec<(LabelSet, SummarySnapshot)>,
    timestamp: Option<i64>,
) {
    for (labels, snapshot) in samples {
        let labels = desc.const_labels().merge(&labels);

        for (quantile, value) in &snapshot.quantiles {
            let labels = with_quantile(&labels, *quantile);
            lines.push(sample_line(desc.name(), "", &labels, &format_f64(*value), timestamp));
        }
        lines.push(sample_line(
            desc.name(),
            "_sum",
            &labels,
            &format_f64(snapshot.sum),
            timestamp,
        ));
        lines.push(sample_line(
            desc.name(),
            "_count",
            &labels,
            itoa::Buffer::new().format(snapshot.count),
            timestamp,
        ));
    }
}

/// Adds the `quantile` label, keeping the labels sorted by name. Summaries
/// reject `quantile` as a label name, so it is never present yet.
fn with_quantile(labels: &[(String, String)], quantile: f64) -> Vec<(String, String)> {
    let mut labels = labels.to_vec();
    let idx = labels.partition_point(|(name, _)| name.as_str() < QUANTILE_LABEL);
    labels.insert(idx, (QUANTILE_LABEL.to_owned(), format_f64(quantile)));
    labels
}

fn sample_line(
    name: &str,
    suffix: &str,
    labels: &[(String, String)],
    value: &str,
    timestamp: Option<i64>,
) -> String {
    let mut line = String::with_capacity(name.len() + 32);
    line.push_str(name);
    line.push_str(suffix);

    if !labels.is_empty() {
        line.push('{');
        for (i, (label, label_value)) in labels.iter().enumerate() {
            if i > 0 {
                line.push(',');
            }
            line.push_str(label);
            line.push_str("=\"");
            escape_label_value(&mut line, label_value);
            line.push('"');
        }
        line.push('}');
    }

    line.push(' ');
    line.push_str(value);

    if let Some(timestamp) = timestamp {
        line.push(' ');
        line.push_str(itoa::Buffer::new().format(timestamp));
    }
    line
}

fn escape_help(help: &str) -> String {
    let mut escaped = String::with_capacity(help.len());
    for c in help.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            c => escaped.push(c),
        }
    }
    escaped
}

fn escape_label_value(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
}
