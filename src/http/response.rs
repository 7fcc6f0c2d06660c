//! HTTP response building module
//!
//! Builders for the responses the dispatcher generates on its own: static
//! files, not-found pages, internal errors and the fallback homepage.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;

pub const INTERNAL_ERROR_BODY: &str = "Internal Server Error";
pub const NOT_FOUND_TEXT: &str = "404 - Resource not found";

const NOT_FOUND_PAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>404 - Page not found</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            display: flex;
            align-items: center;
            justify-content: center;
            min-height: 100vh;
            margin: 0;
            background: #f5f5f7;
            color: #333;
        }
        .container { text-align: center; }
        h1 { font-size: 4em; margin: 0; }
        a { color: #667eea; }
    </style>
</head>
<body>
    <div class="container">
        <h1>404</h1>
        <p>The page you are looking for does not exist.</p>
        <p><a href="/">Back to home</a></p>
    </div>
</body>
</html>"#;

const HOMEPAGE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>Rust Router</title>
    <style>
        body {
            font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Arial, sans-serif;
            background: linear-gradient(135deg, #667eea 0%, #764ba2 100%);
            min-height: 100vh;
            margin: 0;
            display: flex;
            align-items: center;
            justify-content: center;
            color: white;
        }
        .container {
            text-align: center;
            padding: 40px;
            background: rgba(255, 255, 255, 0.1);
            border-radius: 20px;
            max-width: 600px;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>Rust Router</h1>
        <p>The server is up. Register a GET route for <code>/</code> to replace this page.</p>
    </div>
</body>
</html>"#;

/// Build 200 response for a static file
pub fn build_file_response(data: Bytes, content_type: &str) -> Response<Full<Bytes>> {
    let content_length = data.len();
    Response::builder()
        .status(200)
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(Full::new(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            build_500_response()
        })
}

/// Build 404 HTML page for browser-navigable GET misses
pub fn build_404_page_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Full::new(Bytes::from_static(NOT_FOUND_PAGE.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from_static(NOT_FOUND_PAGE.as_bytes())))
        })
}

/// Build 404 plain-text response for non-GET misses
pub fn build_404_text_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(404)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Full::new(Bytes::from_static(NOT_FOUND_TEXT.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(Full::new(Bytes::from_static(NOT_FOUND_TEXT.as_bytes())))
        })
}

/// Build 500 Internal Server Error response
pub fn build_500_response() -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from_static(
        INTERNAL_ERROR_BODY.as_bytes(),
    )));
    *response.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
    response.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("text/plain"),
    );
    response
}

/// Build the default homepage shown for an unrouted `GET /`
pub fn build_homepage_response() -> Response<Full<Bytes>> {
    Response::builder()
        .status(200)
        .header("Content-Type", "text/html; charset=utf-8")
        .header("Content-Length", HOMEPAGE.len())
        .body(Full::new(Bytes::from_static(HOMEPAGE.as_bytes())))
        .unwrap_or_else(|e| {
            log_build_error("homepage", &e);
            build_500_response()
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_string(response: Response<Full<Bytes>>) -> String {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_not_found_flavors_differ() {
        let page = build_404_page_response();
        assert_eq!(page.status(), 404);
        assert!(page.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        let page_body = body_string(page).await;

        let text = build_404_text_response();
        assert_eq!(text.status(), 404);
        assert!(text.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain"));
        let text_body = body_string(text).await;

        assert!(page_body.contains("<html>"));
        assert_eq!(text_body, NOT_FOUND_TEXT);
        assert_ne!(page_body, text_body);
    }

    #[tokio::test]
    async fn test_500_is_plain_text() {
        let response = build_500_response();
        assert_eq!(response.status(), 500);
        assert_eq!(response.headers()["content-type"], "text/plain");
        assert_eq!(body_string(response).await, INTERNAL_ERROR_BODY);
    }

    #[test]
    fn test_file_response_headers() {
        let response = build_file_response(Bytes::from_static(b"body{}"), "text/css");
        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()["content-type"], "text/css");
        assert_eq!(response.headers()["content-length"], "6");
    }
}
