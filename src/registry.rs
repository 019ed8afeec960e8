//! Metric registry implementation.
//!
//! See [`Registry`] for details.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::collector::Collector;
use crate::error::{Error, Result};

/// A metric registry.
///
/// First off one registers collectors with the registry via
/// [`Registry::register`]. Later on the [`Registry`] is passed to an
/// [`Encoder`](crate::encoding::Encoder) which renders every registered
/// collector.
///
/// The directory of collectors has its own lock, independent of the
/// collectors' stores. [`Registry::get_all`] returns a consistent set of
/// collectors, but writers may keep updating their values while they are
/// encoded.
///
/// Cloning a [`Registry`] yields a handle to the same directory.
///
/// ```
/// # use prometheus_exposition::encoding::text::TextEncoder;
/// # use prometheus_exposition::encoding::Encoder;
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::counter::Counter;
/// # use prometheus_exposition::metrics::gauge::Gauge;
/// # use prometheus_exposition::registry::Registry;
/// #
/// let registry = Registry::default();
///
/// let counter = Counter::new("my_counter", "This is my counter", LabelSet::new()).unwrap();
/// let gauge = Gauge::new("my_gauge", "This is my gauge", LabelSet::new()).unwrap();
///
/// registry.register(counter.clone()).unwrap();
/// registry.register(gauge.clone()).unwrap();
///
/// counter.inc(&LabelSet::EMPTY).unwrap();
/// gauge.set(&LabelSet::EMPTY, 3.0).unwrap();
///
/// let buffer = TextEncoder::default().marshall(&registry).unwrap();
/// let expected = "# HELP my_counter This is my counter\n".to_owned() +
///                "# TYPE my_counter counter\n" +
///                "my_counter 1\n" +
///                "# HELP my_gauge This is my gauge\n" +
///                "# TYPE my_gauge gauge\n" +
///                "my_gauge 3\n";
/// assert_eq!(expected, String::from_utf8(buffer).unwrap());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Registry {
    collectors: Arc<RwLock<BTreeMap<String, Collector>>>,
}

impl Registry {
    /// Creates an empty [`Registry`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a collector under its name.
    ///
    /// Fails with [`Error::NameCollision`] if a collector with the same name
    /// is registered already, leaving the registry unchanged.
    pub fn register(&self, collector: impl Into<Collector>) -> Result<()> {
        let collector = collector.into();
        let name = collector.name().to_owned();

        let mut collectors = self.collectors.write();
        if collectors.contains_key(&name) {
            warn!(collector = %name, "collector already registered");
            return Err(Error::NameCollision(name));
        }
        debug!(collector = %name, kind = collector.metric_type().as_str(), "registered collector");
        collectors.insert(name, collector);
        Ok(())
    }

    /// Remove the collector registered under `name`.
    pub fn deregister(&self, name: &str) -> Result<Collector> {
        match self.collectors.write().remove(name) {
            Some(collector) => {
                debug!(collector = %name, "deregistered collector");
                Ok(collector)
            }
            None => Err(Error::NotFound(name.to_owned())),
        }
    }

    /// Returns the collector registered under `name`.
    pub fn get(&self, name: &str) -> Option<Collector> {
        self.collectors.read().get(name).cloned()
    }

    /// All registered collectors, ordered by name.
    pub fn get_all(&self) -> Vec<Collector> {
        self.collectors.read().values().cloned().collect()
    }

    /// Number of registered collectors.
    pub fn len(&self) -> usize {
        self.collectors.read().len()
    }

    /// Whether no collector is registered.
    pub fn is_empty(&self) -> bool {
        self.collectors.read().is_empty()
    }
}
