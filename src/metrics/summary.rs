//! Module implementing a Prometheus summary.
//!
//! See [`Summary`] for details.

use super::quantile::{default_estimator, Estimator, EstimatorConstructor};
use super::store::MetricStore;
use super::{MetricType, TypedMetric};
use crate::collector::Descriptor;
use crate::error::{Error, Result};
use crate::label::LabelSet;
use parking_lot::Mutex;
use std::sync::Arc;

/// Quantiles reported by a [`Summary`] unless configured otherwise.
pub const DEFAULT_QUANTILES: [f64; 3] = [0.5, 0.9, 0.99];

/// Label carrying the quantile of a summary sample. Summaries reject it as a
/// constant or dynamic label name.
pub const QUANTILE_LABEL: &str = "quantile";

type SharedEstimator = Arc<Mutex<Box<dyn Estimator>>>;

/// Prometheus [`Summary`] to measure distributions of discrete events.
///
/// Keeps one [`Estimator`] per label set, created on the first observation
/// through the summary's [`EstimatorConstructor`]. The store lock only covers
/// looking up or creating the estimator; observations and snapshots lock the
/// estimator of their label set.
///
/// ```
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::summary::Summary;
/// let summary = Summary::new("response_size_bytes", "Response sizes.", LabelSet::new()).unwrap();
/// summary.add(&LabelSet::EMPTY, 1).unwrap();
/// summary.add(&LabelSet::EMPTY, 5.0).unwrap();
/// summary.add(&LabelSet::EMPTY, 10.0).unwrap();
///
/// let snapshot = summary.get(&LabelSet::EMPTY).unwrap().unwrap();
/// assert_eq!(3, snapshot.count);
/// assert_eq!(16.0, snapshot.sum);
/// assert_eq!(Some(5.0), snapshot.quantile(0.5));
/// ```
#[derive(Clone)]
pub struct Summary {
    descriptor: Arc<Descriptor>,
    quantiles: Arc<[f64]>,
    constructor: Arc<dyn EstimatorConstructor>,
    values: MetricStore<SharedEstimator>,
}

/// Point in time view of one label set of a [`Summary`].
#[derive(Clone, Debug, PartialEq)]
pub struct SummarySnapshot {
    /// `(quantile, estimated value)` for each configured quantile.
    pub quantiles: Vec<(f64, f64)>,
    /// Sum of all observations.
    pub sum: f64,
    /// Number of observations.
    pub count: u64,
}

impl SummarySnapshot {
    /// Estimated value of the configured quantile `q`.
    pub fn quantile(&self, q: f64) -> Option<f64> {
        self.quantiles
            .iter()
            .find(|(quantile, _)| *quantile == q)
            .map(|(_, v)| *v)
    }
}

impl Summary {
    /// Creates a new [`Summary`] reporting [`DEFAULT_QUANTILES`].
    pub fn new(
        name: impl Into<String>,
        help: impl Into<String>,
        const_labels: impl Into<LabelSet>,
    ) -> Result<Self> {
        Self::with_quantiles(name, help, const_labels, DEFAULT_QUANTILES)
    }

    /// Creates a new [`Summary`] reporting the given quantiles.
    ///
    /// Fails with [`Error::InvalidQuantile`] if a quantile lies outside of
    /// `[0, 1]` and with [`Error::Label`] if the constant labels use
    /// [`QUANTILE_LABEL`].
    pub fn with_quantiles(
        name: impl Into<String>,
        help: impl Into<String>,
        const_labels: impl Into<LabelSet>,
        quantiles: impl IntoIterator<Item = f64>,
    ) -> Result<Self> {
        let descriptor = Descriptor::new(name, help, const_labels)?;
        check_quantile_label(descriptor.const_labels())?;
        let quantiles: Vec<f64> = quantiles.into_iter().collect();
        if let Some(q) = quantiles.iter().find(|q| !(0.0..=1.0).contains(*q)) {
            return Err(Error::InvalidQuantile(*q));
        }

        Ok(Summary {
            descriptor: Arc::new(descriptor),
            quantiles: quantiles.into(),
            constructor: Arc::new(default_estimator),
            values: MetricStore::default(),
        })
    }

    /// Use `constructor` to create the estimator of each new label set.
    ///
    /// Label sets observed before the call keep their estimator.
    pub fn with_estimator(mut self, constructor: impl EstimatorConstructor + 'static) -> Self {
        self.constructor = Arc::new(constructor);
        self
    }

    /// Name, help text and constant labels of the [`Summary`].
    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    /// The quantiles reported for every label set.
    pub fn quantiles(&self) -> &[f64] {
        &self.quantiles
    }

    /// Observe the given value.
    ///
    /// Fails with [`Error::Type`] if the value is not a number.
    pub fn add(&self, labels: &LabelSet, v: impl Into<f64>) -> Result<()> {
        check_quantile_label(labels)?;
        let v = v.into();
        if v.is_nan() {
            return Err(Error::Type(v));
        }
        let estimator = self.values.get_or_create(labels, || {
            Arc::new(Mutex::new(self.constructor.new_estimator(&self.quantiles)))
        })?;
        estimator.lock().observe(v);
        Ok(())
    }

    /// Alias of [`Summary::add`].
    pub fn observe(&self, labels: &LabelSet, v: impl Into<f64>) -> Result<()> {
        self.add(labels, v)
    }

    /// Current quantiles, sum and count for `labels`.
    pub fn get(&self, labels: &LabelSet) -> Result<Option<SummarySnapshot>> {
        check_quantile_label(labels)?;
        Ok(self
            .values
            .get(labels)?
            .map(|estimator| self.snapshot(&estimator)))
    }

    /// Snapshots of all label sets.
    pub fn get_all(&self) -> Vec<(LabelSet, SummarySnapshot)> {
        self.values
            .all()
            .into_iter()
            .map(|(labels, estimator)| (labels, self.snapshot(&estimator)))
            .collect()
    }

    /// Number of label sets seen.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing was observed yet.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    // All values are read under one lock so the snapshot never mixes two
    // states of the estimator.
    fn snapshot(&self, estimator: &SharedEstimator) -> SummarySnapshot {
        let estimator = estimator.lock();
        SummarySnapshot {
            quantiles: self
                .quantiles
                .iter()
                .map(|q| (*q, estimator.query(*q)))
                .collect(),
            sum: estimator.sum(),
            count: estimator.count(),
        }
    }
}

fn check_quantile_label(labels: &LabelSet) -> Result<()> {
    match labels.get(QUANTILE_LABEL) {
        Some(_) => Err(Error::Label(QUANTILE_LABEL.to_owned())),
        None => Ok(()),
    }
}

impl std::fmt::Debug for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Summary")
            .field("descriptor", &self.descriptor)
            .field("quantiles", &self.quantiles)
            .field("values", &self.values)
            .finish()
    }
}

impl TypedMetric for Summary {
    const TYPE: MetricType = MetricType::Summary;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::quantile::ExactEstimator;

    #[test]
    fn summary() {
        let summary = Summary::new("s", "A summary.", LabelSet::new()).unwrap();
        summary.observe(&LabelSet::EMPTY, 1.0).unwrap();
        summary.observe(&LabelSet::EMPTY, 5.0).unwrap();
        summary.observe(&LabelSet::EMPTY, 10.0).unwrap();

        let snapshot = summary.get(&LabelSet::EMPTY).unwrap().unwrap();
        assert_eq!(16.0, snapshot.sum);
        assert_eq!(3, snapshot.count);
        assert_eq!(vec![(0.5, 5.0), (0.9, 10.0), (0.99, 10.0)], snapshot.quantiles);
    }

    #[test]
    fn exact_small_sample() {
        let summary = Summary::new("s", "A summary.", LabelSet::new())
            .unwrap()
            .with_estimator(ExactEstimator::boxed);

        summary.add(&LabelSet::EMPTY, 3).unwrap();
        summary.add(&LabelSet::EMPTY, 5.2).unwrap();
        summary.add(&LabelSet::EMPTY, 13).unwrap();
        summary.add(&LabelSet::EMPTY, 4).unwrap();

        let snapshot = summary.get(&LabelSet::EMPTY).unwrap().unwrap();
        assert_eq!(Some(4.0), snapshot.quantile(0.5));
        assert_eq!(Some(5.2), snapshot.quantile(0.9));
        assert_eq!(Some(5.2), snapshot.quantile(0.99));
        assert!((snapshot.sum - 25.2).abs() < 1e-9);
        assert_eq!(4, snapshot.count);
    }

    #[test]
    fn absent_labels() {
        let summary = Summary::new("s", "A summary.", LabelSet::new()).unwrap();
        assert_eq!(None, summary.get(&LabelSet::from([("a", "b")])).unwrap());
    }

    #[test]
    fn label_sets_are_independent() {
        let summary = Summary::new("s", "A summary.", LabelSet::new())
            .unwrap()
            .with_estimator(ExactEstimator::boxed);
        let a = LabelSet::from([("handler", "a")]);
        let b = LabelSet::from([("handler", "b")]);

        summary.add(&a, 1.0).unwrap();
        summary.add(&b, 2.0).unwrap();
        summary.add(&b, 4.0).unwrap();

        let all = summary.get_all();
        assert_eq!(2, all.len());
        assert_eq!(a, all[0].0);
        assert_eq!(1, all[0].1.count);
        assert_eq!(6.0, all[1].1.sum);
    }

    #[test]
    fn invalid_values() {
        let summary = Summary::new("s", "A summary.", LabelSet::new()).unwrap();
        assert!(matches!(
            summary.add(&LabelSet::EMPTY, f64::NAN),
            Err(Error::Type(_))
        ));
        assert!(matches!(
            summary.add(&LabelSet::from([("job", "x")]), 1.0),
            Err(Error::Label(_))
        ));
        assert!(summary.is_empty());
    }

    #[test]
    fn quantiles_out_of_range() {
        assert!(matches!(
            Summary::with_quantiles("s", "A summary.", LabelSet::new(), [1.0, 5.0, 9.0]),
            Err(Error::InvalidQuantile(q)) if q == 5.0
        ));
    }

    #[test]
    fn quantile_label_is_reserved() {
        assert!(matches!(
            Summary::with_quantiles("s", "A summary.", [("quantile", "x")], [0.5]),
            Err(Error::Label(name)) if name == QUANTILE_LABEL
        ));

        let summary = Summary::new("s", "A summary.", [("app", "web")]).unwrap();
        let labels = LabelSet::from([("handler", "/"), ("quantile", "y")]);
        assert!(matches!(summary.add(&labels, 1.0), Err(Error::Label(_))));
        assert!(matches!(summary.observe(&labels, 1.0), Err(Error::Label(_))));
        assert!(matches!(summary.get(&labels), Err(Error::Label(_))));
        assert!(summary.is_empty());
    }

    #[test]
    fn concurrent_observations() {
        let summary = Summary::new("s", "A summary.", LabelSet::new()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let summary = summary.clone();
                std::thread::spawn(move || {
                    let labels = LabelSet::from([("worker", i % 2)]);
                    for v in 0..250 {
                        summary.add(&labels, v).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let total: u64 = summary.get_all().iter().map(|(_, s)| s.count).sum();
        assert_eq!(1000, total);
        assert_eq!(2, summary.len());
    }
}
