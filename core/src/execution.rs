//! Execution models.
//!
//! A single-user request runs either straight through on the calling thread
//! or as the only task of an event loop created for that call. The loop is a
//! current-thread `tokio` runtime: it is built before the request, drives the
//! transport future to completion, and is dropped before the call returns, so
//! nothing is shared between calls and no other task can interleave.

use tracing::trace;

use crate::error::{ConfigError, RequestError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{CooperativeTransport, Transport};

/// Which model drives a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Blocking,
    Cooperative,
}

/// Run `request` on the calling thread.
pub fn execute_blocking(transport: &dyn Transport, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    transport.get(request)
}

/// Run `request` as the single task of a private event loop.
///
/// Fails with `ConfigError::NestedRuntime` when called from inside a running
/// `tokio` runtime, since a private loop cannot be started there.
pub fn execute_cooperative(
    transport: &dyn CooperativeTransport,
    request: &HttpRequest,
) -> Result<HttpResponse, RequestError> {
    if tokio::runtime::Handle::try_current().is_ok() {
        return Err(ConfigError::NestedRuntime.into());
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(TransportError::Runtime)?;
    trace!("cooperative loop started");
    let result = runtime.block_on(transport.get(request));
    drop(runtime);
    trace!("cooperative loop stopped");
    Ok(result?)
}

/// Dispatch `request` under `mode`.
pub fn execute(
    mode: ExecutionMode,
    blocking: &dyn Transport,
    cooperative: &dyn CooperativeTransport,
    request: &HttpRequest,
) -> Result<HttpResponse, RequestError> {
    match mode {
        ExecutionMode::Blocking => Ok(execute_blocking(blocking, request)?),
        ExecutionMode::Cooperative => execute_cooperative(cooperative, request),
    }
}
