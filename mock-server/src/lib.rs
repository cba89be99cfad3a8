//! Mock of the analytics data feed.
//!
//! Answers GETs the way the real backend does: a JSON report on success and a
//! structured `{"error": {...}}` body on failure, plus one route that fails
//! with a plain-text body. The success body echoes what the server received
//! so tests can assert on headers and query parameters.

use std::collections::BTreeMap;

use axum::{
    extract::Query,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::debug;

pub const DATA_PATH: &str = "/analytics/feeds/data";
pub const UNAVAILABLE_PATH: &str = "/analytics/feeds/unavailable";
pub const BROKEN_PATH: &str = "/analytics/feeds/broken";

/// Token accepted in both `GoogleLogin auth=` and `Bearer` form.
pub const VALID_TOKEN: &str = "valid-token";
/// Only API key accepted when a `key` parameter is sent.
pub const VALID_API_KEY: &str = "test-key";
/// Profile id the valid token has no access to.
pub const FORBIDDEN_IDS: &str = "ga:forbidden";

/// Success body of the data feed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Report {
    pub ids: String,
    pub authorization: String,
    pub gdata_version: Option<String>,
    pub query: BTreeMap<String, String>,
    pub rows: Vec<Vec<String>>,
}

pub fn app() -> Router {
    Router::new()
        .route(DATA_PATH, get(data_feed))
        .route(UNAVAILABLE_PATH, get(unavailable))
        .route(BROKEN_PATH, get(broken))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Structured error response in the backend's wire shape.
pub fn error_response(code: u16, message: &str, errors: Vec<Value>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = json!({ "error": { "code": code, "message": message, "errors": errors } });
    (status, Json(body)).into_response()
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

fn token_is_valid(authorization: &str, gdata_version: Option<&str>) -> bool {
    if let Some(token) = authorization.strip_prefix("GoogleLogin auth=") {
        return token == VALID_TOKEN && gdata_version == Some("3");
    }
    authorization.strip_prefix("Bearer ") == Some(VALID_TOKEN)
}

async fn data_feed(headers: HeaderMap, Query(query): Query<BTreeMap<String, String>>) -> Response {
    let authorization = header(&headers, "authorization").unwrap_or_default();
    let gdata_version = header(&headers, "gdata-version");
    debug!(%authorization, ?query, "data feed request");

    if !token_is_valid(&authorization, gdata_version.as_deref()) {
        return error_response(
            401,
            "Invalid Credentials",
            vec![json!({"domain": "global", "reason": "authError", "location": "Authorization"})],
        );
    }
    if query.get("key").is_some_and(|k| k != VALID_API_KEY) {
        return error_response(400, "Bad Request", vec![json!("keyInvalid")]);
    }
    let Some(ids) = query.get("ids").cloned() else {
        return error_response(400, "Missing ids", vec![json!("ids is required")]);
    };
    if ids == FORBIDDEN_IDS {
        return error_response(403, "User does not have permission to perform this operation", Vec::new());
    }

    Json(Report {
        ids,
        authorization,
        gdata_version,
        query,
        rows: vec![vec!["20100101".to_string(), "42".to_string()]],
    })
    .into_response()
}

async fn unavailable() -> Response {
    error_response(503, "Backend Error", vec![json!({"reason": "backendError"})])
}

async fn broken() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_token_needs_version_header() {
        assert!(token_is_valid("GoogleLogin auth=valid-token", Some("3")));
        assert!(!token_is_valid("GoogleLogin auth=valid-token", None));
        assert!(!token_is_valid("GoogleLogin auth=other", Some("3")));
    }

    #[test]
    fn bearer_token_ignores_version_header() {
        assert!(token_is_valid("Bearer valid-token", None));
        assert!(!token_is_valid("Bearer other", Some("3")));
        assert!(!token_is_valid("", None));
    }

    #[test]
    fn report_serializes_to_json() {
        let report = Report {
            ids: "ga:1".to_string(),
            authorization: "Bearer valid-token".to_string(),
            gdata_version: None,
            query: BTreeMap::from([("ids".to_string(), "ga:1".to_string())]),
            rows: Vec::new(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["ids"], "ga:1");
        assert_eq!(json["query"]["ids"], "ga:1");
        assert!(json["gdata_version"].is_null());
    }
}
