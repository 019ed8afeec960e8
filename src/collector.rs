//! The closed set of collectors a [`Registry`](crate::registry::Registry)
//! and the encoders operate on.
//!
//! See [`Collector`] for details.

use crate::error::{Error, Result};
use crate::label::LabelSet;
use crate::metrics::counter::Counter;
use crate::metrics::gauge::Gauge;
use crate::metrics::summary::Summary;
use crate::metrics::{MetricType, TypedMetric};

/// Name, help text and constant labels of a metric.
#[derive(Clone, Debug, PartialEq)]
pub struct Descriptor {
    name: String,
    help: String,
    const_labels: LabelSet,
}

impl Descriptor {
    /// Create new [`Descriptor`].
    ///
    /// Fails if `name` or `help` is empty or a constant label is reserved.
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        const_labels: impl Into<LabelSet>,
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(Error::MissingName);
        }
        let help = help.into();
        if help.is_empty() {
            return Err(Error::MissingHelp(name));
        }
        let const_labels = const_labels.into();
        const_labels.validate()?;

        Ok(Descriptor {
            name,
            help,
            const_labels,
        })
    }

    /// Returns the metric name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the help text.
    pub fn help(&self) -> &str {
        &self.help
    }

    /// Returns the labels attached to every sample of the metric.
    pub fn const_labels(&self) -> &LabelSet {
        &self.const_labels
    }
}

/// A registrable metric: one of [`Counter`], [`Gauge`] or [`Summary`].
///
/// Encoders match exhaustively on this enum, so a new metric kind has to be
/// handled by every encoder before it compiles.
///
/// ```
/// # use prometheus_exposition::collector::Collector;
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::counter::Counter;
/// # use prometheus_exposition::metrics::MetricType;
/// let counter = Counter::new("requests_total", "Requests served.", LabelSet::new()).unwrap();
/// let collector = Collector::from(counter);
/// assert_eq!("requests_total", collector.name());
/// assert_eq!(MetricType::Counter, collector.metric_type());
/// ```
#[derive(Clone, Debug)]
pub enum Collector {
    /// A monotonically increasing value per label set.
    Counter(Counter),
    /// An arbitrary value per label set.
    Gauge(Gauge),
    /// A quantile summary of observations per label set.
    Summary(Summary),
}

impl Collector {
    /// The collector's descriptor.
    pub fn descriptor(&self) -> &Descriptor {
        match self {
            Collector::Counter(c) => c.descriptor(),
            Collector::Gauge(g) => g.descriptor(),
            Collector::Summary(s) => s.descriptor(),
        }
    }

    /// The collector's name.
    pub fn name(&self) -> &str {
        self.descriptor().name()
    }

    /// The collector's metric type.
    pub fn metric_type(&self) -> MetricType {
        match self {
            Collector::Counter(_) => Counter::TYPE,
            Collector::Gauge(_) => Gauge::TYPE,
            Collector::Summary(_) => Summary::TYPE,
        }
    }

    /// Number of label combinations recorded by the collector.
    pub fn len(&self) -> usize {
        match self {
            Collector::Counter(c) => c.len(),
            Collector::Gauge(g) => g.len(),
            Collector::Summary(s) => s.len(),
        }
    }

    /// Whether the collector has not recorded any sample yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Counter> for Collector {
    fn from(c: Counter) -> Self {
        Collector::Counter(c)
    }
}

impl From<Gauge> for Collector {
    fn from(g: Gauge) -> Self {
        Collector::Gauge(g)
    }
}

impl From<Summary> for Collector {
    fn from(s: Summary) -> Self {
        Collector::Summary(s)
    }
}
