//! Pushing a registry to a Prometheus Pushgateway.
//!
//! See [`Pusher`] for details.

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::encoding::protobuf::ProtobufEncoder;
use crate::encoding::Encoder;
use crate::error::{Error, Result};
use crate::registry::Registry;

/// Where and as whom metrics are pushed.
///
/// Deserializable, so it can be part of an application's configuration file:
///
/// ```
/// # use prometheus_exposition::push::PushConfig;
/// let config: PushConfig = serde_json::from_str(
///     r#"{"gateway": "http://127.0.0.1:9091", "job": "batch", "timeout_ms": 500}"#,
/// ).unwrap();
/// assert_eq!(None, config.instance);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct PushConfig {
    /// Base URL of the Pushgateway, e.g. `http://127.0.0.1:9091`.
    pub gateway: String,
    /// Job name, required.
    pub job: String,
    /// Optional instance name.
    #[serde(default)]
    pub instance: Option<String>,
    /// Request timeout in milliseconds. No timeout if unset.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl PushConfig {
    /// Push as `job` to the Pushgateway at `gateway`.
    pub fn new(gateway: impl Into<String>, job: impl Into<String>) -> Self {
        PushConfig {
            gateway: gateway.into(),
            job: job.into(),
            instance: None,
            timeout_ms: None,
        }
    }

    /// Push under the given instance name.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Abort requests taking longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// HTTP method of a push.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PushMethod {
    /// Replace metrics with the same name, see [`Pusher::add`].
    Post,
    /// Replace all metrics of the group, see [`Pusher::replace`].
    Put,
    /// Delete the group, see [`Pusher::delete`].
    Delete,
}

impl PushMethod {
    /// Method name as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            PushMethod::Post => "POST",
            PushMethod::Put => "PUT",
            PushMethod::Delete => "DELETE",
        }
    }
}

/// A single request towards the Pushgateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PushRequest<'a> {
    /// HTTP method.
    pub method: PushMethod,
    /// Full endpoint URL.
    pub url: &'a str,
    /// Value of the `Content-Type` header.
    pub content_type: &'static str,
    /// Encoded registry.
    pub body: Vec<u8>,
}

/// Sends [`PushRequest`]s.
///
/// Implementations report transport failures and non-2xx statuses as
/// [`Error::Push`].
pub trait Transport: std::fmt::Debug + Send + Sync {
    /// Send the request once.
    fn send(&self, request: PushRequest<'_>) -> Result<()>;
}

/// [`Transport`] using a blocking [`reqwest`] client.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport aborting requests after `timeout`.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Push {
                url: String::new(),
                reason: e.to_string(),
            })?;
        Ok(HttpTransport { client })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: PushRequest<'_>) -> Result<()> {
        let method = match request.method {
            PushMethod::Post => reqwest::Method::POST,
            PushMethod::Put => reqwest::Method::PUT,
            PushMethod::Delete => reqwest::Method::DELETE,
        };

        let response = self
            .client
            .request(method, request.url)
            .header(CONTENT_TYPE, request.content_type)
            .body(request.body)
            .send()
            .map_err(|e| Error::Push {
                url: request.url.to_owned(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Push {
                url: request.url.to_owned(),
                reason: format!("unexpected status {status}"),
            });
        }
        Ok(())
    }
}

/// Pushes registries to a Pushgateway, encoded as delimited protobuf.
///
/// Each call sends exactly one request. Nothing is retried or queued.
///
/// ```no_run
/// # use prometheus_exposition::label::LabelSet;
/// # use prometheus_exposition::metrics::gauge::Gauge;
/// # use prometheus_exposition::push::{PushConfig, Pusher};
/// # use prometheus_exposition::registry::Registry;
/// let registry = Registry::default();
/// let gauge = Gauge::new("last_success", "Last successful run.", LabelSet::new()).unwrap();
/// gauge.set(&LabelSet::EMPTY, 1_700_000_000.0).unwrap();
/// registry.register(gauge).unwrap();
///
/// let pusher = Pusher::new(PushConfig::new("http://127.0.0.1:9091", "batch")).unwrap();
/// pusher.add(&registry).unwrap();
/// ```
#[derive(Debug)]
pub struct Pusher<T: Transport = HttpTransport> {
    endpoint: String,
    transport: T,
    encoder: ProtobufEncoder,
}

impl Pusher<HttpTransport> {
    /// Create a pusher sending over HTTP.
    pub fn new(config: PushConfig) -> Result<Self> {
        let transport = HttpTransport::new(config.timeout())?;
        Self::with_transport(config, transport)
    }
}

impl<T: Transport> Pusher<T> {
    /// Create a pusher sending through `transport`.
    ///
    /// Fails with [`Error::MissingJob`] if the job name is empty.
    pub fn with_transport(config: PushConfig, transport: T) -> Result<Self> {
        if config.job.is_empty() {
            return Err(Error::MissingJob);
        }

        let mut endpoint = format!(
            "{}/metrics/jobs/{}",
            config.gateway.trim_end_matches('/'),
            config.job
        );
        if let Some(instance) = config.instance.as_deref().filter(|i| !i.is_empty()) {
            endpoint.push_str("/instances/");
            endpoint.push_str(instance);
        }

        Ok(Pusher {
            endpoint,
            transport,
            encoder: ProtobufEncoder::default(),
        })
    }

    /// URL every request is sent to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Push with `POST`: only metrics with the same name in the job and
    /// instance group are replaced.
    pub fn add(&self, registry: &Registry) -> Result<()> {
        self.push(PushMethod::Post, registry)
    }

    /// Push with `PUT`: all metrics of the job and instance group are
    /// replaced.
    pub fn replace(&self, registry: &Registry) -> Result<()> {
        self.push(PushMethod::Put, registry)
    }

    /// Delete the job and instance group with `DELETE`. The registry is sent
    /// as body all the same.
    pub fn delete(&self, registry: &Registry) -> Result<()> {
        self.push(PushMethod::Delete, registry)
    }

    fn push(&self, method: PushMethod, registry: &Registry) -> Result<()> {
        let body = self.encoder.marshall(registry)?;
        debug!(
            method = method.as_str(),
            url = %self.endpoint,
            bytes = body.len(),
            "pushing metrics"
        );

        let request = PushRequest {
            method,
            url: &self.endpoint,
            content_type: self.encoder.content_type(),
            body,
        };
        self.transport.send(request).map_err(|e| {
            warn!(method = method.as_str(), error = %e, "push failed");
            e
        })
    }
}
