//! Network transports for single-user requests.
//!
//! # Design
//! Both execution models talk to the network through a trait so tests can
//! swap in a canned transport and force either path deterministically:
//! - `Transport` is the blocking seam, backed by `ureq`.
//! - `CooperativeTransport` is the suspend-at-I/O seam, backed by async
//!   `reqwest` and polled on the per-call event loop in `execution`.
//!
//! Both real transports dial the same URL (`dial_url`), connect through the
//! configured proxy, apply the open and read timeouts, accept any peer
//! certificate, read the whole body without a size cap and decode it lossily.
//! For one input they send the same request-target and return the same
//! `HttpResponse`.
//!
//! TODO: make peer verification opt-in once callers behind re-signing
//! proxies can supply their own roots.

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use crate::config::ClientConfig;
use crate::error::{ConfigError, TransportError};
use crate::http::{HttpRequest, HttpResponse};

/// Future returned by `CooperativeTransport::get`.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, TransportError>> + Send + 'a>>;

/// Performs a GET on the calling thread.
pub trait Transport: Send + Sync {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Performs a GET that suspends at I/O instead of blocking.
pub trait CooperativeTransport: Send + Sync {
    fn get<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a>;
}

/// The URL a real transport connects to: TLS on the endpoint's port unless
/// plain `http` was explicitly allowed.
fn dial_url(request: &HttpRequest, allow_plain_http: bool) -> String {
    if allow_plain_http {
        request.url()
    } else {
        request.tls_url()
    }
}

fn response_headers(headers: &ureq::http::HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
        .collect()
}

/// Blocking transport built on a `ureq` agent.
#[derive(Debug)]
pub struct UreqTransport {
    agent: ureq::Agent,
    allow_plain_http: bool,
}

impl UreqTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        let proxy = match &config.proxy {
            Some(p) => Some(ureq::Proxy::new(&p.url()).map_err(|e| ConfigError::InvalidProxy {
                address: p.url(),
                reason: e.to_string(),
            })?),
            None => None,
        };
        let tls = ureq::tls::TlsConfig::builder().disable_verification(true).build();
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .proxy(proxy)
            .tls_config(tls)
            .timeout_connect(Some(config.open_timeout))
            .timeout_recv_response(Some(config.read_timeout))
            .timeout_recv_body(Some(config.read_timeout))
            .build()
            .new_agent();
        Ok(Self {
            agent,
            allow_plain_http: config.allow_plain_http,
        })
    }
}

impl Transport for UreqTransport {
    fn get(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.agent.get(dial_url(request, self.allow_plain_http));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let mut response = builder.call().inspect_err(|e| warn!(error = %e, "blocking GET failed"))?;

        let status = response.status().as_u16();
        let headers = response_headers(response.headers());
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .inspect_err(|e| warn!(error = %e, "blocking body read failed"))?;
        Ok(HttpResponse::from_bytes(status, headers, &body))
    }
}

/// Cooperative transport built on async `reqwest`.
///
/// A fresh `reqwest::Client` is built inside every call so its connection
/// pool belongs to that call's event loop and is dropped with it.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    config: ClientConfig,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, ConfigError> {
        if let Some(p) = &config.proxy {
            reqwest::Proxy::all(p.url()).map_err(|e| ConfigError::InvalidProxy {
                address: p.url(),
                reason: e.to_string(),
            })?;
        }
        Ok(Self {
            config: config.clone(),
        })
    }

    fn client(&self) -> Result<reqwest::Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(true)
            .connect_timeout(self.config.open_timeout)
            .read_timeout(self.config.read_timeout);
        builder = match &self.config.proxy {
            Some(p) => builder.proxy(reqwest::Proxy::all(p.url())?),
            None => builder.no_proxy(),
        };
        builder.build()
    }

    async fn fetch(&self, request: &HttpRequest) -> Result<HttpResponse, reqwest::Error> {
        let client = self.client()?;
        let mut builder = client.get(dial_url(request, self.config.allow_plain_http));
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers = response_headers(response.headers());
        let body = response.bytes().await?;
        Ok(HttpResponse::from_bytes(status, headers, &body))
    }
}

impl CooperativeTransport for ReqwestTransport {
    fn get<'a>(&'a self, request: &'a HttpRequest) -> TransportFuture<'a> {
        Box::pin(async move {
            self.fetch(request)
                .await
                .inspect_err(|e| warn!(error = %e, "cooperative GET failed"))
                .map_err(TransportError::from)
        })
    }
}
