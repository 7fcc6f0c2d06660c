//! Response writer handed to route handlers
//!
//! Collects status, headers and body for one response. Exactly one terminal
//! operation (`end`, `end_empty`, `send`, `json`) is expected per request;
//! the first one wins and later calls are ignored with a warning.

use crate::http::response;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use serde::Serialize;

pub const CONTENT_TYPE: &str = "Content-Type";
pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

/// Body accepted by [`ResponseWriter::send`]
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Written verbatim as `text/plain`
    Text(String),
    /// Serialized as JSON
    Structured(serde_json::Value),
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<serde_json::Value> for Payload {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}

/// Stateful wrapper around one outgoing response
#[derive(Debug)]
pub struct ResponseWriter {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
    head_written: bool,
    finished: bool,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    /// Transport defaults: 200, no headers, empty body
    pub const fn new() -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: Bytes::new(),
            head_written: false,
            finished: false,
        }
    }

    /// Begin the response with a status and header set.
    ///
    /// Meant to be called once, before the terminal write. A repeated call
    /// replaces the status and merges headers.
    pub fn set_headers<I, K, V>(&mut self, status: u16, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        if self.finished {
            logger::log_warning("set_headers called after the response was finished");
            return;
        }
        if self.head_written {
            logger::log_warning("set_headers called more than once for one response");
        }
        self.status = status;
        for (name, value) in headers {
            self.set_header(name, value);
        }
        self.head_written = true;
    }

    /// Set one header, replacing an existing one with the same name
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        if let Some(slot) = self
            .headers
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(&name))
        {
            slot.1 = value;
        } else {
            self.headers.push((name, value));
        }
    }

    /// Flush a raw body with whatever status and headers were set before
    pub fn end(&mut self, data: impl Into<Bytes>) {
        if self.begin_terminal("end") {
            self.body = data.into();
        }
    }

    /// Flush with no body
    pub fn end_empty(&mut self) {
        self.end(Bytes::new());
    }

    /// Structured data goes out as JSON, text verbatim as `text/plain`
    pub fn send(&mut self, status: u16, data: impl Into<Payload>) {
        match data.into() {
            Payload::Text(text) => {
                if self.begin_terminal("send") {
                    self.status = status;
                    self.set_header(CONTENT_TYPE, TEXT_PLAIN);
                    self.body = Bytes::from(text);
                }
            }
            Payload::Structured(value) => self.json(status, &value),
        }
    }

    /// Always serialize `data` as JSON
    pub fn json<T: Serialize + ?Sized>(&mut self, status: u16, data: &T) {
        if !self.begin_terminal("json") {
            return;
        }
        match serde_json::to_vec(data) {
            Ok(body) => {
                self.status = status;
                self.set_header(CONTENT_TYPE, APPLICATION_JSON);
                self.body = Bytes::from(body);
            }
            Err(e) => {
                logger::log_error(&format!("Failed to serialize JSON response: {e}"));
                self.status = 500;
                self.set_header(CONTENT_TYPE, TEXT_PLAIN);
                self.body = Bytes::from_static(response::INTERNAL_ERROR_BODY.as_bytes());
            }
        }
    }

    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Case-insensitive lookup of a header set so far
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub const fn body(&self) -> &Bytes {
        &self.body
    }

    /// Whether a terminal write has happened
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Convert into a transport response
    pub fn into_response(self) -> Response<Full<Bytes>> {
        let mut builder = Response::builder().status(self.status);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder.body(Full::new(self.body)).unwrap_or_else(|e| {
            logger::log_error(&format!("Failed to build handler response: {e}"));
            response::build_500_response()
        })
    }

    fn begin_terminal(&mut self, operation: &str) -> bool {
        if self.finished {
            logger::log_warning(&format!(
                "Ignoring `{operation}`: response already finished"
            ));
            return false;
        }
        self.finished = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[test]
    fn test_send_structured_as_json() {
        let mut res = ResponseWriter::new();
        res.send(201, json!({"status": "ok"}));
        assert_eq!(res.status(), 201);
        assert_eq!(res.header("content-type"), Some(APPLICATION_JSON));
        assert_eq!(res.body().as_ref(), br#"{"status":"ok"}"#);
        assert!(res.is_finished());
    }

    #[test]
    fn test_send_text_verbatim() {
        let mut res = ResponseWriter::new();
        res.send(200, "hello");
        assert_eq!(res.status(), 200);
        assert_eq!(res.header(CONTENT_TYPE), Some(TEXT_PLAIN));
        assert_eq!(res.body().as_ref(), b"hello");
    }

    #[test]
    fn test_send_json_string_value_is_text() {
        let mut res = ResponseWriter::new();
        res.send(200, json!("plain"));
        assert_eq!(res.header(CONTENT_TYPE), Some(TEXT_PLAIN));
        assert_eq!(res.body().as_ref(), b"plain");
    }

    #[test]
    fn test_json_serializes_any_shape() {
        #[derive(Serialize)]
        struct User {
            id: u32,
            name: &'static str,
        }

        let mut res = ResponseWriter::new();
        res.json(200, &User { id: 7, name: "ada" });
        assert_eq!(res.header(CONTENT_TYPE), Some(APPLICATION_JSON));
        assert_eq!(res.body().as_ref(), br#"{"id":7,"name":"ada"}"#);

        let mut res = ResponseWriter::new();
        res.json(200, "just a string");
        assert_eq!(res.header(CONTENT_TYPE), Some(APPLICATION_JSON));
        assert_eq!(res.body().as_ref(), br#""just a string""#);
    }

    #[test]
    fn test_end_uses_previous_headers() {
        let mut res = ResponseWriter::new();
        res.set_headers(202, [("Content-Type", "text/csv"), ("X-Trace", "abc")]);
        res.end("a,b\n1,2\n");
        assert_eq!(res.status(), 202);
        assert_eq!(res.header("content-type"), Some("text/csv"));
        assert_eq!(res.header("x-trace"), Some("abc"));
        assert_eq!(res.body().as_ref(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_end_without_headers_uses_defaults() {
        let mut res = ResponseWriter::new();
        res.end_empty();
        assert_eq!(res.status(), 200);
        assert!(res.body().is_empty());
        assert!(res.header(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_send_overrides_content_type_keeps_other_headers() {
        let mut res = ResponseWriter::new();
        res.set_header("content-type", "text/html");
        res.set_header("Cache-Control", "no-store");
        res.send(200, "x");
        assert_eq!(res.header(CONTENT_TYPE), Some(TEXT_PLAIN));
        assert_eq!(res.header("cache-control"), Some("no-store"));
    }

    #[test]
    fn test_second_terminal_write_ignored() {
        let mut res = ResponseWriter::new();
        res.send(200, "first");
        res.json(500, &json!({"second": true}));
        assert_eq!(res.status(), 200);
        assert_eq!(res.body().as_ref(), b"first");
    }

    #[tokio::test]
    async fn test_into_response() {
        let mut res = ResponseWriter::new();
        res.send(404, "gone");
        let response = res.into_response();
        assert_eq!(response.status(), 404);
        assert_eq!(response.headers()["content-type"], TEXT_PLAIN);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"gone");
    }

    #[test]
    fn test_invalid_status_becomes_500() {
        let mut res = ResponseWriter::new();
        res.send(1000, "bad");
        assert_eq!(res.into_response().status(), 500);
    }
}
