//! Label dimensioned sample storage.
//!
//! See [`MetricStore`] for details.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::label::{LabelKey, LabelSet};

/// Map of [`LabelKey`] to sample, shared by all clones of one metric.
///
/// Every access validates the given [`LabelSet`] before taking the lock. The
/// lock is held for a single read-modify-write only, so updates to one key
/// serialize while the store never blocks longer than that critical section.
/// Entries are never removed.
#[derive(Debug)]
pub struct MetricStore<V> {
    samples: Arc<Mutex<BTreeMap<LabelKey, V>>>,
}

impl<V> Clone for MetricStore<V> {
    fn clone(&self) -> Self {
        Self {
            samples: self.samples.clone(),
        }
    }
}

impl<V> Default for MetricStore<V> {
    fn default() -> Self {
        Self {
            samples: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }
}

impl<V: Clone> MetricStore<V> {
    /// Stores `value` under `labels`, replacing any previous sample.
    pub fn set(&self, labels: &LabelSet, value: V) -> Result<()> {
        labels.validate()?;
        let key = labels.key();
        self.samples.lock().insert(key, value);
        Ok(())
    }

    /// Returns the sample stored under `labels`, if any.
    pub fn get(&self, labels: &LabelSet) -> Result<Option<V>> {
        labels.validate()?;
        let key = labels.key();
        Ok(self.samples.lock().get(&key).cloned())
    }

    /// Atomically replaces the sample under `labels` with `f(current)`.
    ///
    /// If `f` fails the stored sample is left untouched. Returns the previous
    /// sample.
    pub fn update<F>(&self, labels: &LabelSet, f: F) -> Result<Option<V>>
    where
        F: FnOnce(Option<&V>) -> Result<V>,
    {
        labels.validate()?;
        let key = labels.key();

        let mut samples = self.samples.lock();
        let previous = samples.get(&key).cloned();
        let next = f(previous.as_ref())?;
        samples.insert(key, next);
        Ok(previous)
    }

    /// Returns the sample under `labels`, inserting `init()` first if absent.
    pub fn get_or_create<F>(&self, labels: &LabelSet, init: F) -> Result<V>
    where
        F: FnOnce() -> V,
    {
        labels.validate()?;
        let key = labels.key();
        Ok(self.samples.lock().entry(key).or_insert_with(init).clone())
    }

    /// All samples with their decoded label sets, ordered by key.
    pub fn all(&self) -> Vec<(LabelSet, V)> {
        self.samples
            .lock()
            .iter()
            .map(|(key, value)| (key.decode(), value.clone()))
            .collect()
    }
}

impl<V> MetricStore<V> {
    /// Number of label combinations seen so far.
    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    /// Whether no sample was recorded yet.
    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }
}
