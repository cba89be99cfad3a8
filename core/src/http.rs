//! HTTP exchange types shared by every execution path.
//!
//! # Design
//! Requests and responses are plain data. The orchestrator builds an
//! `HttpRequest`, hands it to a transport, and classifies the returned
//! `HttpResponse`. Keeping both as owned values lets the blocking path, the
//! cooperative path and the OAuth access token all produce the same shape, so
//! the classifier never needs to know which path ran.
//!
//! The wire form of a request (`target`, `url`, `tls_url`) and the decoding of
//! a response body live here rather than in the transports, so `ureq` and
//! `reqwest` put the same bytes on the wire and hand back the same text.
//!
//! Every request issued by this crate is a GET, so no method field is carried.

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Fixed protocol version header sent with legacy and OAuth requests.
pub const GDATA_VERSION: (&str, &str) = ("GData-Version", "3");

/// Bytes that may not appear raw in a request-target. `%` is absent on
/// purpose: values the caller already escaped pass through untouched.
const TARGET_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'\'')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// A GET request described as plain data.
///
/// `origin` is `scheme://host[:port]` of the endpoint and `path` is the
/// relative URI (path plus query string) exactly as assembled, unescaped.
/// The transport connects to the origin and requests the path, the way a
/// connection to an already-known host is driven.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub origin: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// `path` with every byte that is illegal in a request-target written as
    /// `%XX`. Everything else, including `:`, `=`, `,` and `;`, is sent as is.
    pub fn target(&self) -> String {
        utf8_percent_encode(&self.path, TARGET_ENCODE_SET).to_string()
    }

    /// Origin plus encoded target.
    pub fn url(&self) -> String {
        format!("{}{}", self.origin, self.target())
    }

    /// `url` with a plain `http` origin upgraded to TLS on the same port.
    pub fn tls_url(&self) -> String {
        let Some(authority) = self.origin.strip_prefix("http://") else {
            return self.url();
        };
        let host_end = authority.rfind(']').map_or(0, |i| i + 1);
        if authority[host_end..].contains(':') {
            format!("https://{authority}{}", self.target())
        } else {
            format!("https://{authority}:80{}", self.target())
        }
    }
}

/// An HTTP response described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Build a response from raw body bytes. Invalid UTF-8 is replaced with
    /// U+FFFD so a garbled error body still reaches the classifier.
    pub fn from_bytes(status: u16, headers: Vec<(String, String)>, body: &[u8]) -> Self {
        Self {
            status,
            headers,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }

    /// `true` for the 2xx family. An explicit status of 200 is a member.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// One-line description used by the post-dispatch trace point.
    pub fn summary(&self) -> String {
        format!("HTTP {} ({} bytes)", self.status, self.body.len())
    }
}
