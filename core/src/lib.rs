//! Request execution engine for the analytics data API.
//!
//! # Overview
//! Turns a base endpoint plus query parameters into one authenticated GET,
//! runs it, and classifies the outcome as a successful `HttpResponse` or a
//! typed `ClientError`.
//!
//! # Design
//! - `uri` assembles absolute and relative URIs, injecting the API key
//!   without touching the caller's parameters.
//! - `auth` resolves a `Session` into a closed `AuthStrategy` once per call.
//! - `execution` runs single-user requests either blocking on the caller's
//!   thread or on a private single-threaded event loop; `transport` provides
//!   the `ureq` and `reqwest` backends behind swappable traits.
//! - `classify` maps non-success bodies onto the `ClientError` taxonomy and
//!   never fails on a malformed body.
//! - `client::AnalyticsClient` composes the steps around an immutable
//!   `ClientConfig`.

pub mod auth;
pub mod classify;
pub mod client;
pub mod config;
pub mod error;
pub mod execution;
pub mod http;
pub mod session;
pub mod transport;
pub mod uri;

pub use auth::{AuthStrategy, SingleUserAuth};
pub use classify::{check, classify};
pub use client::AnalyticsClient;
pub use config::{ClientConfig, Proxy, TraceSink};
pub use error::{ClientError, ConfigError, ErrorDetails, RequestError, TransportError};
pub use execution::ExecutionMode;
pub use http::{HttpRequest, HttpResponse};
pub use session::{AccessToken, Session};
pub use transport::{CooperativeTransport, ReqwestTransport, Transport, TransportFuture, UreqTransport};
pub use uri::{DataRequest, Parameters};
