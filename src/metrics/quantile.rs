//! Streaming quantile estimation used by [`Summary`](super::summary::Summary).
//!
//! The sketch itself is not implemented here: [`CkmsEstimator`] wraps the
//! CKMS implementation of the `quantiles` crate. Any other sketch can be
//! plugged in through [`Estimator`] and [`EstimatorConstructor`].

use quantiles::ckms::CKMS;

/// Default allowed rank error of [`CkmsEstimator`].
pub const DEFAULT_TARGET_ERROR: f64 = 0.01;

/// A streaming rank estimator tracking observation count and sum.
pub trait Estimator: Send + std::fmt::Debug {
    /// Record one observation.
    fn observe(&mut self, v: f64);

    /// Estimated value at quantile `q` (`0.0..=1.0`), `NaN` without
    /// observations.
    fn query(&self, q: f64) -> f64;

    /// Sum of all observations.
    fn sum(&self) -> f64;

    /// Number of observations.
    fn count(&self) -> u64;
}

/// Creates a fresh [`Estimator`] for every new label set of a summary.
///
/// Closures work out of the box:
///
/// ```
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::quantile::{CkmsEstimator, Estimator};
/// # use prometheus_exposition::metrics::summary::Summary;
/// let summary = Summary::new("latency_seconds", "Request latency.", LabelSet::new())
///     .unwrap()
///     .with_estimator(|_quantiles: &[f64]| -> Box<dyn Estimator> {
///         Box::new(CkmsEstimator::new(0.001))
///     });
/// summary.add(&LabelSet::EMPTY, 0.2).unwrap();
/// ```
pub trait EstimatorConstructor: Send + Sync {
    /// Build an estimator answering queries for `quantiles`.
    fn new_estimator(&self, quantiles: &[f64]) -> Box<dyn Estimator>;
}

impl<F> EstimatorConstructor for F
where
    F: Fn(&[f64]) -> Box<dyn Estimator> + Send + Sync,
{
    fn new_estimator(&self, quantiles: &[f64]) -> Box<dyn Estimator> {
        self(quantiles)
    }
}

/// Constructor used by summaries unless configured otherwise.
pub(crate) fn default_estimator(_quantiles: &[f64]) -> Box<dyn Estimator> {
    Box::new(CkmsEstimator::new(DEFAULT_TARGET_ERROR))
}

/// [`Estimator`] backed by a CKMS sketch.
#[derive(Debug)]
pub struct CkmsEstimator {
    sketch: CKMS<f64>,
    sum: f64,
    count: u64,
}

impl CkmsEstimator {
    /// Create a new estimator with the given allowed rank error.
    pub fn new(target_error: f64) -> Self {
        CkmsEstimator {
            sketch: CKMS::new(target_error),
            sum: 0.0,
            count: 0,
        }
    }
}

impl Default for CkmsEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_TARGET_ERROR)
    }
}

impl Estimator for CkmsEstimator {
    fn observe(&mut self, v: f64) {
        self.sketch.insert(v);
        self.sum += v;
        self.count += 1;
    }

    fn query(&self, q: f64) -> f64 {
        match self.sketch.query(q) {
            Some((_, v)) => v,
            None => f64::NAN,
        }
    }

    fn sum(&self) -> f64 {
        self.sum
    }

    fn count(&self) -> u64 {
        self.count
    }
}

/// Exact estimator keeping every observation.
///
/// Answers `query(q)` with the observation at rank `floor(q * (n - 1))`.
/// Only suitable for tests and small samples.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct ExactEstimator {
    values: Vec<f64>,
    sum: f64,
}

#[cfg(any(test, feature = "test-util"))]
impl ExactEstimator {
    /// Constructor usable with
    /// [`Summary::with_estimator`](super::summary::Summary::with_estimator).
    pub fn boxed(_quantiles: &[f64]) -> Box<dyn Estimator> {
        Box::<ExactEstimator>::default()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl Estimator for ExactEstimator {
    fn observe(&mut self, v: f64) {
        let idx = self.values.partition_point(|x| *x <= v);
        self.values.insert(idx, v);
        self.sum += v;
    }

    fn query(&self, q: f64) -> f64 {
        if self.values.is_empty() {
            return f64::NAN;
        }
        let rank = (q * (self.values.len() - 1) as f64).floor() as usize;
        self.values[rank.min(self.values.len() - 1)]
    }

    fn sum(&self) -> f64 {
        self.sum
    }

    fn count(&self) -> u64 {
        self.values.len() as u64
    }
}
