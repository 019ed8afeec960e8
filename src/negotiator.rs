//! Content negotiation based on the HTTP `Accept` header.
//!
//! ```
//! # use prometheus_exposition::encoding::Format;
//! # use prometheus_exposition::negotiator::negotiate;
//! let headers = [
//!     ("Accept", "application/vnd.google.protobuf;proto=io.prometheus.client.MetricFamily;encoding=delimited"),
//!     ("Accept-Encoding", "gzip"),
//! ];
//! assert_eq!(Format::Protobuf, negotiate(headers));
//! assert_eq!(Format::Text, negotiate([("accept", "*/*")]));
//! ```
//!
//! The header value is split on `;` and every segment is compared verbatim,
//! after trimming, against the parameters of each known format. Quality
//! factors and comma separated alternatives are not interpreted.

use tracing::trace;

use crate::encoding::Format;

const PROTOBUF: &[&str] = &[
    "application/vnd.google.protobuf",
    "proto=io.prometheus.client.MetricFamily",
    "encoding=delimited",
];

const PROTOBUF_TEXT: &[&str] = &[
    "application/vnd.google.protobuf",
    "proto=io.prometheus.client.MetricFamily",
    "encoding=text",
];

const TEXT_0_0_4: &[&str] = &["text/plain", "version=0.0.4"];

const TEXT: &[&str] = &["text/plain"];

/// Format served when the client expresses no supported preference.
pub const FALLBACK: Format = Format::Text;

/// Select the exposition format for a request given its headers.
///
/// Header names are matched case-insensitively. A missing `Accept` header
/// selects [`FALLBACK`].
pub fn negotiate<I, K, V>(headers: I) -> Format
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let accept = headers
        .into_iter()
        .find(|(name, _)| name.as_ref().eq_ignore_ascii_case("accept"))
        .map(|(_, value)| value.as_ref().to_owned());

    negotiate_accept(accept.as_deref())
}

/// Select the exposition format for a raw `Accept` header value.
pub fn negotiate_accept(accept: Option<&str>) -> Format {
    let accept = accept.unwrap_or("*/*");
    let segments: Vec<&str> = accept.split(';').map(str::trim).collect();
    let matches = |expected: &[&str]| expected.iter().all(|e| segments.contains(e));

    let format = if matches(PROTOBUF) {
        Format::Protobuf
    } else if matches(PROTOBUF_TEXT) {
        Format::ProtobufText
    } else if matches(TEXT_0_0_4) || matches(TEXT) {
        Format::Text
    } else {
        FALLBACK
    };

    trace!(accept, ?format, "negotiated exposition format");
    format
}
