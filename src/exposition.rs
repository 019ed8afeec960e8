//! The `GET /metrics` contract, independent of any HTTP server.
//!
//! ```
//! # use prometheus_exposition::exposition::{render, METRICS_PATH};
//! # use prometheus_exposition::label::LabelSet;
//! # use prometheus_exposition::metrics::gauge::Gauge;
//! # use prometheus_exposition::registry::Registry;
//! let registry = Registry::default();
//! let gauge = Gauge::new("up", "Whether the service is up.", LabelSet::new()).unwrap();
//! gauge.set(&LabelSet::EMPTY, 1.0).unwrap();
//! registry.register(gauge).unwrap();
//!
//! // Inside the request handler of `METRICS_PATH`:
//! let exposition = render(&registry, [("Accept", "text/plain")]).unwrap();
//! assert_eq!("text/plain; version=0.0.4; charset=utf-8", exposition.content_type);
//! assert_eq!(b"# HELP up Whether the service is up.\n# TYPE up gauge\nup 1\n", &exposition.body[..]);
//! ```

use crate::error::Result;
use crate::negotiator::negotiate;
use crate::registry::Registry;

/// Path Prometheus scrapes by default.
pub const METRICS_PATH: &str = "/metrics";

/// A rendered scrape response, to be served with status `200`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Exposition {
    /// Value of the `Content-Type` response header.
    pub content_type: &'static str,
    /// Response body.
    pub body: Vec<u8>,
}

/// Render `registry` in the format the request headers ask for, without
/// timestamps.
pub fn render<I, K, V>(registry: &Registry, headers: I) -> Result<Exposition>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let encoder = negotiate(headers).encoder();
    Ok(Exposition {
        content_type: encoder.content_type(),
        body: encoder.marshall(registry)?,
    })
}
