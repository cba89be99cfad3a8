//! Response classification.
//!
//! Non-success bodies are expected in the shape
//! `{"error": {"code": 403, "message": "...", "errors": [...]}}`. Anything
//! else, including a body that is not JSON at all, becomes
//! `ClientError::Generic` carrying the raw body as its message.

use serde::Deserialize;

use crate::error::{ClientError, ErrorDetails};
use crate::http::HttpResponse;

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: WireError,
}

#[derive(Debug, Deserialize)]
struct WireError {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

/// Check `response` without consuming it.
///
/// Calling this twice on the same response yields equal results.
pub fn check(response: &HttpResponse, uri: &str) -> Result<(), ClientError> {
    if response.is_success() {
        return Ok(());
    }
    Err(parse_error(&response.body, uri))
}

/// Pass a successful response through, or turn it into a `ClientError`.
pub fn classify(response: HttpResponse, uri: &str) -> Result<HttpResponse, ClientError> {
    check(&response, uri)?;
    Ok(response)
}

fn parse_error(body: &str, uri: &str) -> ClientError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => ClientError::from_code(
            error.code,
            ErrorDetails {
                message: error.message,
                code: error.code,
                errors: error.errors,
                uri: uri.to_string(),
            },
        ),
        Err(_) => ClientError::Generic(ErrorDetails {
            message: body.to_string(),
            code: None,
            errors: Vec::new(),
            uri: uri.to_string(),
        }),
    }
}
