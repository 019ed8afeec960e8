//! Error type shared by all components.

/// Errors returned by metric mutation, registration, encoding and pushing.
///
/// Every failure is local and synchronous: the operation that returns an
/// [`Error`] has not mutated any store or registry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A label name is reserved (`job`) or uses the reserved `__` prefix.
    #[error("label `{0}` is reserved")]
    Label(String),

    /// A collector with the same name is already registered.
    #[error("collector `{0}` is already registered")]
    NameCollision(String),

    /// No collector is registered under the given name.
    #[error("collector `{0}` not found")]
    NotFound(String),

    /// A counter was asked to decrease.
    #[error("counters can only increase, got {0}")]
    Range(f64),

    /// A summary was asked to observe a value that is not a number.
    #[error("summary observations must be numeric, got {0}")]
    Type(f64),

    /// Output could not be written or serialized.
    #[error("failed to encode metrics: {0}")]
    Format(String),

    /// A collector was constructed without a name.
    #[error("metric name is required")]
    MissingName,

    /// A collector was constructed without a help text.
    #[error("help text is required for `{0}`")]
    MissingHelp(String),

    /// A configured summary quantile lies outside of `[0, 1]`.
    #[error("quantile {0} is out of range")]
    InvalidQuantile(f64),

    /// A pusher was configured without a job name.
    #[error("pushgateway job name is required")]
    MissingJob,

    /// Sending metrics to the Pushgateway failed.
    #[error("push to {url} failed: {reason}")]
    Push {
        /// Endpoint the request was sent to.
        url: String,
        /// Transport error or unexpected status.
        reason: String,
    },
}

impl From<std::fmt::Error> for Error {
    fn from(e: std::fmt::Error) -> Self {
        Error::Format(e.to_string())
    }
}

impl From<prost::EncodeError> for Error {
    fn from(e: prost::EncodeError) -> Self {
        Error::Format(e.to_string())
    }
}

/// Result type used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
