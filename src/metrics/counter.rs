//! Module implementing a Prometheus counter.
//!
//! See [`Counter`] for details.

use super::store::MetricStore;
use super::{MetricType, TypedMetric};
use crate::collector::Descriptor;
use crate::error::{Error, Result};
use crate::label::LabelSet;
use std::sync::Arc;

/// Prometheus [`Counter`] to measure discrete events.
///
/// One monotonically increasing value per label set. Cloning a [`Counter`]
/// yields a handle to the same values.
///
/// ```
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::counter::Counter;
/// let counter = Counter::new("http_requests_total", "Requests served.", LabelSet::new()).unwrap();
/// let labels = LabelSet::from([("method", "GET")]);
/// counter.inc(&labels).unwrap();
/// counter.add(&labels, 2.0).unwrap();
/// assert_eq!(Some(3.0), counter.get(&labels).unwrap());
/// ```
#[derive(Clone, Debug)]
pub struct Counter {
    descriptor: Arc<Descriptor>,
    values: MetricStore<f64>,
}

impl Counter {
    /// Creates a new [`Counter`].
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        const_labels: impl Into<LabelSet>,
    ) -> Result<Self> {
        Ok(Counter {
            descriptor: Arc::new(Descriptor::new(name, help, const_labels)?),
            values: MetricStore::default(),
        })
    }

    /// Name, help text and constant labels of the [`Counter`].
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// Sets the value for `labels` unconditionally.
    ///
    /// Meant for restoring a previously persisted counter, not for regular
    /// instrumentation.
    pub fn set(&self, labels: &LabelSet, v: f64) -> Result<()> {
        self.values.set(labels, v)
    }

    /// Get the current value for `labels`.
    pub fn get(&self, labels: &LabelSet) -> Result<Option<f64>> {
        self.values.get(labels)
    }

    /// Increase the [`Counter`] by 1, returning the previous value.
    pub fn inc(&self, labels: &LabelSet) -> Result<f64> {
        self.add(labels, 1.0)
    }

    /// Increase the [`Counter`] by `v`, returning the previous value.
    ///
    /// Fails with [`Error::Range`] if `v` is negative.
    pub fn add(&self, labels: &LabelSet, v: f64) -> Result<f64> {
        if !(v >= 0.0) {
            return Err(Error::Range(v));
        }
        let previous = self
            .values
            .update(labels, |current| Ok(current.copied().unwrap_or_default() + v))?;
        Ok(previous.unwrap_or_default())
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

impl TypedMetric for Counter {
    const TYPE: MetricType = MetricType::Counter;
}
