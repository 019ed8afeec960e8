//! Exposition format implementations.
//!
//! Every format implements [`Encoder`]. [`Format`] names the available
//! formats and is what [`negotiate`](crate::negotiator::negotiate) selects.

use crate::collector::Collector;
use crate::error::Result;
use crate::registry::Registry;
use std::time::{SystemTime, UNIX_EPOCH};

pub mod protobuf;
pub mod text;

/// Renders collectors into one exposition format.
pub trait Encoder: Send + Sync + std::fmt::Debug {
    /// The media type of the produced output, used as `Content-Type`.
    fn content_type(&self) -> &'static str;

    /// Encode a single collector.
    fn marshall_collector(&self, collector: &Collector) -> Result<Vec<u8>>;

    /// Encode every collector registered with `registry`.
    fn marshall(&self, registry: &Registry) -> Result<Vec<u8>>;
}

/// The supported exposition formats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Format {
    /// Text format version 0.0.4.
    #[default]
    Text,
    /// Length delimited binary `io.prometheus.client.MetricFamily` messages.
    Protobuf,
    /// `io.prometheus.client.MetricFamily` messages in protobuf text format.
    ProtobufText,
}

impl Format {
    /// The media type of the format.
    pub fn content_type(&self) -> &'static str {
        match self {
            Format::Text => text::CONTENT_TYPE,
            Format::Protobuf => protobuf::CONTENT_TYPE,
            Format::ProtobufText => protobuf::TEXT_CONTENT_TYPE,
        }
    }

    /// An encoder for the format, without timestamps.
    pub fn encoder(&self) -> Box<dyn Encoder> {
        match self {
            Format::Text => Box::new(text::TextEncoder::default()),
            Format::Protobuf => Box::new(protobuf::ProtobufEncoder::default()),
            Format::ProtobufText => Box::new(protobuf::ProtobufTextEncoder::default()),
        }
    }
}

// Integers up to 2^53 are exact in a f64.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes `v` the way Prometheus parses it back. Integral values never carry
/// a fractional part; beyond 2^53 they keep all their digits, or switch to
/// exponent form from 1e21 on. Other values use the shortest round-trip form.
pub(crate) fn write_f64(out: &mut String, v: f64) {
    if v.is_nan() {
        out.push_str("NaN");
    } else if v.is_infinite() {
        out.push_str(if v > 0.0 { "+Inf" } else { "-Inf" });
    } else if v.fract() == 0.0 && v.abs() < MAX_EXACT_INTEGER {
        out.push_str(itoa::Buffer::new().format(v as i64));
    } else {
        let mut buf = dtoa::Buffer::new();
        let s = buf.format(v);
        out.push_str(s.strip_suffix(".0").unwrap_or(s));
    }
}

pub(crate) fn format_f64(v: f64) -> String {
    let mut out = String::new();
    write_f64(&mut out, v);
    out
}

/// Milliseconds since the Unix epoch.
pub(crate) fn timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}
