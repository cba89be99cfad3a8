//! Client configuration.
//!
//! # Design
//! Values that other clients of this API keep as process-wide settings (API
//! key, proxy, timeouts, execution model, log sink) live in one immutable
//! `ClientConfig` handed to `AnalyticsClient` at construction. A client reads
//! it concurrently from any number of threads and never writes it.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::error::ConfigError;

/// Connect and read timeout applied when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

pub const ENV_API_KEY: &str = "ANALYTICS_API_KEY";
pub const ENV_PROXY_HOST: &str = "ANALYTICS_PROXY_HOST";
pub const ENV_PROXY_PORT: &str = "ANALYTICS_PROXY_PORT";
pub const ENV_OPEN_TIMEOUT: &str = "ANALYTICS_OPEN_TIMEOUT";
pub const ENV_READ_TIMEOUT: &str = "ANALYTICS_READ_TIMEOUT";
pub const ENV_COOPERATIVE: &str = "ANALYTICS_COOPERATIVE";

/// Receives the pre-dispatch and post-dispatch trace strings of every call.
pub trait TraceSink: Send + Sync {
    fn record(&self, event: &str);
}

/// Forward proxy for blocking and cooperative single-user requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proxy {
    pub host: String,
    pub port: u16,
}

impl Proxy {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Clone)]
pub struct ClientConfig {
    pub api_key: Option<String>,
    pub proxy: Option<Proxy>,
    pub open_timeout: Duration,
    pub read_timeout: Duration,
    /// Run single-user requests on a per-call cooperative event loop.
    pub cooperative: bool,
    /// Dial `http` endpoints without TLS. Off by default, where every
    /// single-user request is upgraded to TLS on the endpoint's port.
    pub allow_plain_http: bool,
    pub trace_sink: Option<Arc<dyn TraceSink>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            proxy: None,
            open_timeout: DEFAULT_TIMEOUT,
            read_timeout: DEFAULT_TIMEOUT,
            cooperative: false,
            allow_plain_http: false,
            trace_sink: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("proxy", &self.proxy)
            .field("open_timeout", &self.open_timeout)
            .field("read_timeout", &self.read_timeout)
            .field("cooperative", &self.cooperative)
            .field("allow_plain_http", &self.allow_plain_http)
            .field("trace_sink", &self.trace_sink.is_some())
            .finish()
    }
}

impl ClientConfig {
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy = Some(Proxy {
            host: host.into(),
            port,
        });
        self
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_cooperative(mut self, cooperative: bool) -> Self {
        self.cooperative = cooperative;
        self
    }

    /// Local test servers only; credentials travel in cleartext.
    pub fn with_plain_http(mut self, allow: bool) -> Self {
        self.allow_plain_http = allow;
        self
    }

    pub fn with_trace_sink(mut self, sink: Arc<dyn TraceSink>) -> Self {
        self.trace_sink = Some(sink);
        self
    }

    /// Load configuration from `ANALYTICS_*` environment variables.
    ///
    /// Unset variables keep their defaults. A proxy port without a proxy host
    /// is ignored; a proxy host without a port uses 80.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as `from_env` but reads through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        config.api_key = lookup(ENV_API_KEY).filter(|k| !k.is_empty());

        if let Some(host) = lookup(ENV_PROXY_HOST).filter(|h| !h.is_empty()) {
            let port = match lookup(ENV_PROXY_PORT) {
                Some(raw) => parse_env(ENV_PROXY_PORT, &raw, |v| v.parse::<u16>().ok())?,
                None => 80,
            };
            config.proxy = Some(Proxy { host, port });
        }
        if let Some(raw) = lookup(ENV_OPEN_TIMEOUT) {
            config.open_timeout = parse_env(ENV_OPEN_TIMEOUT, &raw, parse_seconds)?;
        }
        if let Some(raw) = lookup(ENV_READ_TIMEOUT) {
            config.read_timeout = parse_env(ENV_READ_TIMEOUT, &raw, parse_seconds)?;
        }
        if let Some(raw) = lookup(ENV_COOPERATIVE) {
            config.cooperative = parse_env(ENV_COOPERATIVE, &raw, parse_flag)?;
        }
        Ok(config)
    }

    /// Forward a trace string to the sink, if one is configured.
    pub(crate) fn trace(&self, event: &str) {
        if let Some(sink) = &self.trace_sink {
            sink.record(event);
        }
    }
}

fn parse_env<T>(
    var: &'static str,
    raw: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, ConfigError> {
    parse(raw.trim()).ok_or_else(|| ConfigError::InvalidEnv {
        var,
        value: raw.to_string(),
    })
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    raw.parse::<f64>()
        .ok()
        .filter(|s| s.is_finite() && *s >= 0.0)
        .map(Duration::from_secs_f64)
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
