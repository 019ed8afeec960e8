//! Metric type implementations.

pub mod counter;
pub mod gauge;
pub mod quantile;
pub mod store;
pub mod summary;

/// A metric that is aware of its Prometheus metric type.
pub trait TypedMetric {
    /// The Prometheus metric type.
    const TYPE: MetricType;
}

/// Prometheus metric type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum MetricType {
    Counter,
    Gauge,
    Summary,
}

impl MetricType {
    /// Returns the given metric type's str representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "counter",
            MetricType::Gauge => "gauge",
            MetricType::Summary => "summary",
        }
    }
}
