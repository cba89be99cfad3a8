//! Session and access-token seams.
//!
//! # Design
//! Acquiring credentials (login, OAuth handshake, token storage) happens
//! elsewhere. The engine only asks a session which regime it is in and for
//! the credential that regime needs. The OAuth access token is a capability:
//! it signs and sends the GET itself, so the engine never sees the signature.

use std::fmt;

use crate::error::TransportError;
use crate::http::HttpResponse;

/// An OAuth access token able to perform a signed GET.
pub trait AccessToken: Send + Sync + fmt::Debug {
    /// Raw token value, sent as a bearer token on single-user sessions.
    fn token(&self) -> &str;

    /// Issue a signed GET against `absolute_uri` with the extra `headers`.
    fn get(&self, absolute_uri: &str, headers: &[(String, String)]) -> Result<HttpResponse, TransportError>;
}

/// Credential state of an authenticated session.
pub trait Session {
    /// Authenticated with a static legacy or bearer token.
    fn is_single_user(&self) -> bool;

    /// Authenticated through the OAuth flow.
    fn is_oauth_user(&self) -> bool;

    fn legacy_auth_token(&self) -> Option<&str>;

    fn oauth_access_token(&self) -> Option<&dyn AccessToken>;
}
