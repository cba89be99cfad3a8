//! Authentication strategy selection.
//!
//! A session is resolved once per call into a closed `AuthStrategy`. The
//! single-user variants carry the header credential and the execution model;
//! the OAuth variant carries the access token that will send the request.

use crate::error::ConfigError;
use crate::http::GDATA_VERSION;
use crate::session::{AccessToken, Session};

/// Header credential for a single-user session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleUserAuth<'s> {
    /// An OAuth access token present on an otherwise single-user session.
    Bearer(&'s str),
    /// Legacy client-login token.
    Legacy(&'s str),
}

impl SingleUserAuth<'_> {
    /// Headers to attach to the outgoing request.
    pub fn headers(&self) -> Vec<(String, String)> {
        match self {
            SingleUserAuth::Bearer(token) => {
                vec![("Authorization".to_string(), format!("Bearer {token}"))]
            }
            SingleUserAuth::Legacy(token) => vec![
                ("Authorization".to_string(), format!("GoogleLogin auth={token}")),
                (GDATA_VERSION.0.to_string(), GDATA_VERSION.1.to_string()),
            ],
        }
    }
}

/// How a request will be authenticated and executed.
#[derive(Debug, Clone, Copy)]
pub enum AuthStrategy<'s> {
    SingleUserBlocking(SingleUserAuth<'s>),
    SingleUserCooperative(SingleUserAuth<'s>),
    OAuth(&'s dyn AccessToken),
}

impl<'s> AuthStrategy<'s> {
    /// Resolve the strategy for `session`.
    ///
    /// Single-user takes precedence when a session reports both modes.
    /// `cooperative` selects the execution model for single-user sessions;
    /// OAuth requests are always sent by the access token on the calling
    /// thread.
    pub fn select(session: &'s dyn Session, cooperative: bool) -> Result<Self, ConfigError> {
        if session.is_single_user() {
            let auth = match (session.oauth_access_token(), session.legacy_auth_token()) {
                (Some(access), _) => SingleUserAuth::Bearer(access.token()),
                (None, Some(token)) => SingleUserAuth::Legacy(token),
                (None, None) => return Err(ConfigError::MissingSingleUserToken),
            };
            Ok(if cooperative {
                AuthStrategy::SingleUserCooperative(auth)
            } else {
                AuthStrategy::SingleUserBlocking(auth)
            })
        } else if session.is_oauth_user() {
            session
                .oauth_access_token()
                .map(AuthStrategy::OAuth)
                .ok_or(ConfigError::MissingAccessToken)
        } else {
            Err(ConfigError::NoAuthMode)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AuthStrategy::SingleUserBlocking(_) => "single-user-blocking",
            AuthStrategy::SingleUserCooperative(_) => "single-user-cooperative",
            AuthStrategy::OAuth(_) => "oauth",
        }
    }
}
