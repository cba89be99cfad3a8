//! Request URI assembly.
//!
//! Parameters are written as `key=value` pairs joined by `&` with no escaping
//! beyond plain stringification; existing callers pass pre-formatted values
//! such as `ga:123` and `ga:visits,ga:pageviews` and rely on them reaching the
//! backend verbatim.

use std::collections::BTreeMap;

use url::Url;

use crate::error::ConfigError;

/// Query parameters for one request. Iteration order is the key order, which
/// keeps serialization deterministic.
pub type Parameters = BTreeMap<String, String>;

/// Name of the query parameter carrying the process-wide API key.
pub const API_KEY_PARAM: &str = "key";

/// Absolute and relative forms of the same request URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestUris {
    pub absolute: String,
    pub relative: String,
}

/// Serialize parameters into a query string, including the leading `?`.
///
/// The API key, when given, replaces any caller-supplied `key` entry and is
/// always written last. `parameters` is never modified.
pub fn query_string(parameters: &Parameters, api_key: Option<&str>) -> String {
    let mut pairs: Vec<String> = parameters
        .iter()
        .filter(|(k, _)| api_key.is_none() || k.as_str() != API_KEY_PARAM)
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    if let Some(key) = api_key {
        pairs.push(format!("{API_KEY_PARAM}={key}"));
    }
    if pairs.is_empty() {
        String::new()
    } else {
        format!("?{}", pairs.join("&"))
    }
}

/// Parse a base endpoint, rejecting anything the transports cannot dial.
pub fn parse_endpoint(base_endpoint: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(base_endpoint).map_err(|e| ConfigError::InvalidEndpoint {
        endpoint: base_endpoint.to_string(),
        reason: e.to_string(),
    })?;
    if url.host_str().is_none() {
        return Err(ConfigError::InvalidEndpoint {
            endpoint: base_endpoint.to_string(),
            reason: "endpoint has no host".to_string(),
        });
    }
    Ok(url)
}

/// Build both URI forms for a parsed endpoint.
pub fn build_uris(endpoint: &Url, parameters: &Parameters, api_key: Option<&str>) -> RequestUris {
    let query = query_string(parameters, api_key);
    RequestUris {
        absolute: format!("{}{query}", endpoint.as_str()),
        relative: format!("{}{query}", endpoint.path()),
    }
}

/// A single analytics request: endpoint, parameters and resolved URIs.
///
/// URIs are resolved once at construction and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRequest {
    endpoint: Url,
    parameters: Parameters,
    uris: RequestUris,
}

impl DataRequest {
    pub fn new(
        base_endpoint: &str,
        parameters: Parameters,
        api_key: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let endpoint = parse_endpoint(base_endpoint)?;
        let uris = build_uris(&endpoint, &parameters, api_key);
        Ok(Self {
            endpoint,
            parameters,
            uris,
        })
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn absolute_uri(&self) -> &str {
        &self.uris.absolute
    }

    pub fn relative_uri(&self) -> &str {
        &self.uris.relative
    }

    /// `scheme://host[:port]` of the endpoint.
    pub fn origin(&self) -> String {
        self.endpoint.origin().ascii_serialization()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Parameters {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn api_key_is_appended_to_absolute_uri() {
        let req = DataRequest::new("https://example.com/data", params(&[("ids", "ga:123")]), Some("K")).unwrap();
        assert_eq!(req.absolute_uri(), "https://example.com/data?ids=ga:123&key=K");
        assert_eq!(req.relative_uri(), "/data?ids=ga:123&key=K");
    }

    #[test]
    fn empty_parameters_produce_no_query() {
        let req = DataRequest::new("https://example.com/data", Parameters::new(), None).unwrap();
        assert_eq!(req.absolute_uri(), "https://example.com/data");
        assert_eq!(req.relative_uri(), "/data");
    }

    #[test]
    fn api_key_alone_still_produces_query() {
        assert_eq!(query_string(&Parameters::new(), Some("K")), "?key=K");
    }

    #[test]
    fn pairs_are_written_in_key_order() {
        let p = params(&[("start-date", "2010-01-01"), ("ids", "ga:1"), ("metrics", "ga:visits")]);
        assert_eq!(
            query_string(&p, Some("K")),
            "?ids=ga:1&metrics=ga:visits&start-date=2010-01-01&key=K"
        );
    }

    #[test]
    fn configured_key_overrides_caller_key() {
        let p = params(&[("key", "caller"), ("ids", "ga:1")]);
        assert_eq!(query_string(&p, Some("K")), "?ids=ga:1&key=K");
        assert_eq!(query_string(&p, None), "?ids=ga:1&key=caller");
    }

    #[test]
    fn api_key_injection_leaves_parameters_untouched() {
        let p = params(&[("ids", "ga:1")]);
        let before = p.clone();
        let req = DataRequest::new("https://example.com/data", p, Some("K")).unwrap();
        assert_eq!(req.parameters(), &before);
        assert!(!req.parameters().contains_key(API_KEY_PARAM));
    }

    #[test]
    fn values_are_not_escaped() {
        let p = params(&[("filters", "ga:country==United States;ga:city=~^Lon")]);
        assert_eq!(query_string(&p, None), "?filters=ga:country==United States;ga:city=~^Lon");
    }

    #[test]
    fn origin_keeps_non_default_port() {
        let req = DataRequest::new("http://127.0.0.1:8080/feeds/data", Parameters::new(), None).unwrap();
        assert_eq!(req.origin(), "http://127.0.0.1:8080");
        let req = DataRequest::new("https://example.com/feeds/data", Parameters::new(), None).unwrap();
        assert_eq!(req.origin(), "https://example.com");
    }

    #[test]
    fn rejects_unparseable_endpoint() {
        let err = DataRequest::new("not a url", Parameters::new(), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }

    #[test]
    fn rejects_endpoint_without_host() {
        let err = DataRequest::new("data:text/plain,hello", Parameters::new(), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEndpoint { .. }));
    }
}
