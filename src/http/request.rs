//! Per-request view handed to route handlers

use crate::routing::Params;
use hyper::header::HeaderMap;
use hyper::Method;
use std::collections::HashMap;

/// Method, path, headers and (for dynamic routes) path parameters of one request
#[derive(Debug, Clone)]
pub struct RequestView {
    pub method: Method,
    /// Path with the query string already removed
    pub path: String,
    pub headers: HashMap<String, String>,
    pub params: Params,
}

impl RequestView {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: HashMap::new(),
            params: Params::new(),
        }
    }

    /// Build a view from transport headers.
    ///
    /// Values that are not visible ASCII are skipped; for repeated headers the
    /// first occurrence wins.
    pub fn from_parts(method: Method, path: &str, header_map: &HeaderMap) -> Self {
        let mut headers = HashMap::with_capacity(header_map.len());
        for (name, value) in header_map {
            if let Ok(value) = value.to_str() {
                headers
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| value.to_string());
            }
        }

        Self {
            method,
            path: path.to_string(),
            headers,
            params: Params::new(),
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::header::HeaderValue;

    #[test]
    fn test_from_parts_copies_headers() {
        let mut map = HeaderMap::new();
        map.insert("user-agent", HeaderValue::from_static("curl/8.0"));
        map.append("accept", HeaderValue::from_static("text/html"));
        map.append("accept", HeaderValue::from_static("application/json"));

        let view = RequestView::from_parts(Method::GET, "/index", &map);
        assert_eq!(view.method, Method::GET);
        assert_eq!(view.path, "/index");
        assert_eq!(view.header("User-Agent"), Some("curl/8.0"));
        assert_eq!(view.header("accept"), Some("text/html"));
        assert!(view.params.is_empty());
    }

    #[test]
    fn test_non_ascii_header_skipped() {
        let mut map = HeaderMap::new();
        map.insert(
            "x-name",
            HeaderValue::from_bytes("caf\u{e9}".as_bytes()).unwrap(),
        );
        let view = RequestView::from_parts(Method::POST, "/", &map);
        assert_eq!(view.header("x-name"), None);
    }
}
