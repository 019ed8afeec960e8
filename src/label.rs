//! Label sets and their canonical identity.
//!
//! A [`LabelSet`] is what instrumentation code hands to a metric. Before a
//! sample is stored or looked up, the set is validated and turned into a
//! [`LabelKey`], the canonical, order independent form used as map key.

use std::collections::{BTreeMap, HashMap};

use crate::error::{Error, Result};

/// Label names that may not be used on any metric.
pub const RESERVED_LABELS: &[&str] = &["job"];

/// Prefix reserved for internal use by the Prometheus server.
pub const RESERVED_PREFIX: &str = "__";

/// An unordered mapping of label names to label values.
///
/// Inserting a name twice keeps the last value. Values can be anything that
/// renders to a string, so `("data", 1)` and `("data", "1")` describe the same
/// time series.
///
/// ```
/// # use prometheus_exposition::label::LabelSet;
/// let a = LabelSet::from([("device", "mobile"), ("country", "ch")]);
/// let b = LabelSet::from([("country", "ch"), ("device", "mobile")]);
/// assert_eq!(a.key(), b.key());
/// ```
#[derive(Clone, Debug, Default)]
pub struct LabelSet(Vec<(String, String)>);

impl LabelSet {
    /// The empty label set.
    pub const EMPTY: LabelSet = LabelSet(Vec::new());

    /// Creates an empty [`LabelSet`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, replacing a previous value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl ToString) {
        let name = name.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder flavour of [`LabelSet::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.insert(name, value);
        self
    }

    /// Returns the value of the label `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Iterates the label pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of labels.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no labels.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fails with [`Error::Label`] on the first reserved label name.
    pub fn validate(&self) -> Result<()> {
        match self.0.iter().find(|(name, _)| is_reserved(name)) {
            Some((name, _)) => Err(Error::Label(name.clone())),
            None => Ok(()),
        }
    }

    /// Canonical key of this set.
    pub fn key(&self) -> LabelKey {
        if self.0.is_empty() {
            return LabelKey::EMPTY;
        }
        let mut pairs = self.0.clone();
        pairs.sort();
        LabelKey(pairs)
    }

    /// Union of `self` (constant labels) and `labels`, sorted by name. Labels
    /// in `labels` win over constant labels with the same name.
    pub fn merge(&self, labels: &LabelSet) -> Vec<(String, String)> {
        let mut merged: BTreeMap<&str, &str> = self.iter().collect();
        merged.extend(labels.iter());
        merged
            .into_iter()
            .map(|(n, v)| (n.to_owned(), v.to_owned()))
            .collect()
    }
}

/// Two sets are equal if they hold the same pairs, regardless of order.
impl PartialEq for LabelSet {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for LabelSet {}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for LabelSet {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: ToString> From<Vec<(K, V)>> for LabelSet {
    fn from(pairs: Vec<(K, V)>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: ToString> From<HashMap<K, V>> for LabelSet {
    fn from(pairs: HashMap<K, V>) -> Self {
        pairs.into_iter().collect()
    }
}

impl<K: Into<String>, V: ToString> From<BTreeMap<K, V>> for LabelSet {
    fn from(pairs: BTreeMap<K, V>) -> Self {
        pairs.into_iter().collect()
    }
}

impl From<&LabelKey> for LabelSet {
    fn from(key: &LabelKey) -> Self {
        LabelSet(key.0.clone())
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = LabelSet::new();
        for (name, value) in iter {
            set.insert(name, value);
        }
        set
    }
}

/// Canonical identity of a [`LabelSet`]: its pairs sorted by name.
///
/// The key is reversible, see [`LabelKey::decode`]. The empty set maps to
/// [`LabelKey::EMPTY`], which no non-empty set can produce.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelKey(Vec<(String, String)>);

impl LabelKey {
    /// Key of the empty label set.
    pub const EMPTY: LabelKey = LabelKey(Vec::new());

    /// Recovers the label set this key was built from.
    pub fn decode(&self) -> LabelSet {
        LabelSet::from(self)
    }

    /// The sorted label pairs.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.0
    }
}

fn is_reserved(name: &str) -> bool {
    RESERVED_LABELS.contains(&name) || name.starts_with(RESERVED_PREFIX)
}
