//! Error types for the analytics request engine.
//!
//! # Design
//! Three independent failure families meet in `RequestError`:
//! - `ClientError` is the typed taxonomy for non-success backend responses.
//!   The variant is chosen from the backend-supplied code only, so callers
//!   can match on it to decide remediation.
//! - `TransportError` covers everything that prevented a response from
//!   arriving at all (DNS, connect, TLS, timeouts). It is surfaced as-is and
//!   never folded into `ClientError`.
//! - `ConfigError` covers requests that could not be issued because the
//!   session or configuration does not describe a usable call.

use std::fmt;

use thiserror::Error;

/// Payload shared by every `ClientError` variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorDetails {
    pub message: String,
    pub code: Option<i64>,
    /// Sub-errors exactly as the backend sent them (strings or objects).
    pub errors: Vec<serde_json::Value>,
    /// Absolute URI of the request that failed.
    pub uri: String,
}

impl fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "[{code}] {} : {}", self.message, self.uri),
            None => write!(f, "{} : {}", self.message, self.uri),
        }
    }
}

/// Typed failure for a response the backend answered with a non-success status.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// Backend code 400.
    #[error("bad request: {0}")]
    BadRequest(ErrorDetails),

    /// Backend code 401.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(ErrorDetails),

    /// Backend code 403.
    #[error("insufficient permissions: {0}")]
    InsufficientPermissions(ErrorDetails),

    /// Backend code 503.
    #[error("backend error: {0}")]
    Backend(ErrorDetails),

    /// Any other code, or a body that is not a structured error.
    #[error("client error: {0}")]
    Generic(ErrorDetails),
}

impl ClientError {
    /// Pick the variant for a backend code.
    pub fn from_code(code: Option<i64>, details: ErrorDetails) -> Self {
        match code {
            Some(400) => ClientError::BadRequest(details),
            Some(401) => ClientError::InvalidCredentials(details),
            Some(403) => ClientError::InsufficientPermissions(details),
            Some(503) => ClientError::Backend(details),
            _ => ClientError::Generic(details),
        }
    }

    pub fn details(&self) -> &ErrorDetails {
        match self {
            ClientError::BadRequest(d)
            | ClientError::InvalidCredentials(d)
            | ClientError::InsufficientPermissions(d)
            | ClientError::Backend(d)
            | ClientError::Generic(d) => d,
        }
    }

    pub fn message(&self) -> &str {
        &self.details().message
    }

    pub fn code(&self) -> Option<i64> {
        self.details().code
    }

    pub fn errors(&self) -> &[serde_json::Value] {
        &self.details().errors
    }

    pub fn uri(&self) -> &str {
        &self.details().uri
    }

    /// The session's credentials were rejected or lack scope.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            ClientError::InvalidCredentials(_) | ClientError::InsufficientPermissions(_)
        )
    }

    /// The backend reported itself unavailable; a later attempt may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ClientError::Backend(_))
    }
}

/// Failure to complete the HTTP exchange.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("blocking transport failed: {0}")]
    Blocking(#[from] ureq::Error),

    #[error("cooperative transport failed: {0}")]
    Cooperative(#[from] reqwest::Error),

    #[error("failed to start cooperative event loop: {0}")]
    Runtime(#[source] std::io::Error),

    /// Raised by custom transports and access tokens.
    #[error("{0}")]
    Other(String),
}

/// The request could not be issued as configured.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("session is neither single-user nor OAuth; no request was issued")]
    NoAuthMode,

    #[error("single-user session has neither an access token nor a legacy auth token")]
    MissingSingleUserToken,

    #[error("OAuth session has no access token")]
    MissingAccessToken,

    #[error("invalid base endpoint {endpoint:?}: {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("invalid value {value:?} for {var}")]
    InvalidEnv { var: &'static str, value: String },

    #[error("invalid proxy {address:?}: {reason}")]
    InvalidProxy { address: String, reason: String },

    #[error("cooperative execution cannot start inside a running async runtime")]
    NestedRuntime,
}

/// Everything `AnalyticsClient::request` can fail with.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl RequestError {
    pub fn as_client_error(&self) -> Option<&ClientError> {
        match self {
            RequestError::Client(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(code: Option<i64>) -> ErrorDetails {
        ErrorDetails {
            message: "Forbidden".to_string(),
            code,
            errors: Vec::new(),
            uri: "https://example.com/data?ids=ga:1".to_string(),
        }
    }

    #[test]
    fn code_table() {
        assert!(matches!(ClientError::from_code(Some(400), details(Some(400))), ClientError::BadRequest(_)));
        assert!(matches!(ClientError::from_code(Some(401), details(Some(401))), ClientError::InvalidCredentials(_)));
        assert!(matches!(
            ClientError::from_code(Some(403), details(Some(403))),
            ClientError::InsufficientPermissions(_)
        ));
        assert!(matches!(ClientError::from_code(Some(503), details(Some(503))), ClientError::Backend(_)));
        assert!(matches!(ClientError::from_code(Some(500), details(Some(500))), ClientError::Generic(_)));
        assert!(matches!(ClientError::from_code(None, details(None)), ClientError::Generic(_)));
    }

    #[test]
    fn display_includes_code_when_present() {
        let err = ClientError::from_code(Some(403), details(Some(403)));
        assert_eq!(
            err.to_string(),
            "insufficient permissions: [403] Forbidden : https://example.com/data?ids=ga:1"
        );
        let err = ClientError::from_code(None, details(None));
        assert_eq!(err.to_string(), "client error: Forbidden : https://example.com/data?ids=ga:1");
    }

    #[test]
    fn remediation_helpers() {
        assert!(ClientError::from_code(Some(401), details(Some(401))).requires_reauthentication());
        assert!(ClientError::from_code(Some(403), details(Some(403))).requires_reauthentication());
        assert!(!ClientError::from_code(Some(400), details(Some(400))).requires_reauthentication());
        assert!(ClientError::from_code(Some(503), details(Some(503))).is_retryable());
        assert!(!ClientError::from_code(Some(500), details(Some(500))).is_retryable());
    }

    #[test]
    fn request_error_exposes_client_error() {
        let err: RequestError = ClientError::from_code(Some(400), details(Some(400))).into();
        assert_eq!(err.as_client_error().and_then(ClientError::code), Some(400));
        let err: RequestError = ConfigError::NoAuthMode.into();
        assert!(err.as_client_error().is_none());
    }
}
