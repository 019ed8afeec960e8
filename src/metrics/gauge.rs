//! Module implementing a Prometheus gauge.
//!
//! See [`Gauge`] for details.

use super::store::MetricStore;
use super::{MetricType, TypedMetric};
use crate::collector::Descriptor;
use crate::error::Result;
use crate::label::LabelSet;
use std::sync::Arc;

/// Prometheus [`Gauge`] to record current measurements.
///
/// One increasing, decreasing or constant value per label set.
///
/// ```
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::gauge::Gauge;
/// let gauge = Gauge::new("queue_length", "Items waiting.", LabelSet::new()).unwrap();
/// gauge.set(&LabelSet::EMPTY, 42.0).unwrap();
/// gauge.dec(&LabelSet::EMPTY).unwrap();
/// assert_eq!(Some(41.0), gauge.get(&LabelSet::EMPTY).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Gauge {
    descriptor: Arc<Descriptor>,
    values: MetricStore<f64>,
}

impl Gauge {
    /// Creates a new [`Gauge`].
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        const_labels: impl Into<LabelSet>,
    ) -> Result<Self> {
        Ok(Gauge {
            descriptor: Arc::new(Descriptor::new(name, help, const_labels)?),
            values: MetricStore::default(),
        })
    }

    /// Name, help text and constant labels of the [`Gauge`].
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Sets the [`Gauge`] to `v`.
    pub fn set(&self, labels: &LabelSet, v: f64) -> Result<()> {
        self.values.set(labels, v)
    }

    /// Get the current value of the [`Gauge`].
    pub fn get(&self, labels: &LabelSet) -> Result<Option<f64>> {
        self.values.get(labels)
    }

    /// Increase the [`Gauge`] by 1, returning the previous value.
    pub fn inc(&self, labels: &LabelSet) -> Result<f64> {
        self.add(labels, 1.0)
    }

    /// Decrease the [`Gauge`] by 1, returning the previous value.
    pub fn dec(&self, labels: &LabelSet) -> Result<f64> {
        self.add(labels, -1.0)
    }

    /// Increase the [`Gauge`] by `v`, returning the previous value. A negative
    /// `v` decreases the gauge.
    pub fn add(&self, labels: &LabelSet, v: f64) -> Result<f64> {
        let previous = self
            .values
            .update(labels, |current| Ok(current.copied().unwrap_or_default() + v))?;
        Ok(previous.unwrap_or_default())
    }

    /// Decrease the [`Gauge`] by `v`, returning the previous value. A negative
    /// `v` increases the gauge.
    pub fn sub(&self, labels: &LabelSet, v: f64) -> Result<f64> {
        self.add(labels, -v)
    }

    /// All label sets with their current value.
    pub fn get_all(&self) -> Vec<(LabelSet, f64)> {
        self.values.all()
    }

    /// Number of label sets seen.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no value was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TypedMetric for Gauge {
    const TYPE: MetricType = MetricType::Gauge;
}
