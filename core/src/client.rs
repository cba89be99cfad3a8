//! Request orchestration.
//!
//! # Design
//! `AnalyticsClient` holds an immutable `ClientConfig` and the two transports
//! and carries no other state between calls. Each call builds a
//! `DataRequest`, resolves the session into an `AuthStrategy`, runs the
//! exchange under the strategy's execution model, and classifies the
//! response. Transport and configuration failures are returned as-is; only
//! non-success backend responses become `ClientError`.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::auth::{AuthStrategy, SingleUserAuth};
use crate::classify::classify;
use crate::config::ClientConfig;
use crate::error::{ConfigError, RequestError};
use crate::execution::{execute, ExecutionMode};
use crate::http::{HttpRequest, HttpResponse, GDATA_VERSION};
use crate::session::Session;
use crate::transport::{CooperativeTransport, ReqwestTransport, Transport, UreqTransport};
use crate::uri::{DataRequest, Parameters};

/// Executes analytics API requests on behalf of a session.
#[derive(Clone)]
pub struct AnalyticsClient {
    config: ClientConfig,
    blocking: Arc<dyn Transport>,
    cooperative: Arc<dyn CooperativeTransport>,
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AnalyticsClient {
    /// Client backed by the `ureq` and `reqwest` transports.
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let blocking = Arc::new(UreqTransport::new(&config)?);
        let cooperative = Arc::new(ReqwestTransport::new(&config)?);
        Ok(Self::with_transports(config, blocking, cooperative))
    }

    pub fn with_transports(
        config: ClientConfig,
        blocking: Arc<dyn Transport>,
        cooperative: Arc<dyn CooperativeTransport>,
    ) -> Self {
        Self {
            config,
            blocking,
            cooperative,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Resolve URIs for `base_endpoint` and `parameters` under this client's
    /// API key.
    pub fn build_request(&self, base_endpoint: &str, parameters: Parameters) -> Result<DataRequest, ConfigError> {
        DataRequest::new(base_endpoint, parameters, self.config.api_key.as_deref())
    }

    /// Build, authenticate, execute and classify one GET.
    pub fn request(
        &self,
        session: &dyn Session,
        base_endpoint: &str,
        parameters: Parameters,
    ) -> Result<HttpResponse, RequestError> {
        let request = self.build_request(base_endpoint, parameters)?;
        self.send(session, &request)
    }

    /// Execute a request built by `build_request`.
    #[instrument(name = "analytics_request", skip_all, fields(uri = request.relative_uri(), strategy = tracing::field::Empty))]
    pub fn send(&self, session: &dyn Session, request: &DataRequest) -> Result<HttpResponse, RequestError> {
        let strategy = AuthStrategy::select(session, self.config.cooperative)
            .inspect_err(|e| warn!(error = %e, "no usable authentication strategy"))?;
        tracing::Span::current().record("strategy", strategy.name());

        let pre = format!("Request -> {}", request.relative_uri());
        debug!("{pre}");
        self.config.trace(&pre);

        let response = match strategy {
            AuthStrategy::SingleUserBlocking(auth) => self.dispatch(ExecutionMode::Blocking, auth, request)?,
            AuthStrategy::SingleUserCooperative(auth) => self.dispatch(ExecutionMode::Cooperative, auth, request)?,
            AuthStrategy::OAuth(token) => {
                let headers = vec![(GDATA_VERSION.0.to_string(), GDATA_VERSION.1.to_string())];
                token.get(request.absolute_uri(), &headers)?
            }
        };

        let post = format!("Response -> {}", response.summary());
        debug!("{post}");
        self.config.trace(&post);

        classify(response, request.absolute_uri()).map_err(|e| {
            warn!(error = %e, "request failed");
            RequestError::from(e)
        })
    }

    fn dispatch(
        &self,
        mode: ExecutionMode,
        auth: SingleUserAuth<'_>,
        request: &DataRequest,
    ) -> Result<HttpResponse, RequestError> {
        let http = HttpRequest {
            origin: request.origin(),
            path: request.relative_uri().to_string(),
            headers: auth.headers(),
        };
        execute(mode, self.blocking.as_ref(), self.cooperative.as_ref(), &http)
    }
}
