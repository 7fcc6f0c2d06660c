// Connection handling module
// Serves accepted TCP connections with hyper and hands requests to the router

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use http_body_util::Full;
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, SERVER};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, Version};
use hyper_util::rt::TokioIo;

use super::ServeOptions;
use crate::handler::Router;
use crate::http::RequestView;
use crate::logger::{self, AccessLogEntry};

/// One counted connection; the count is released on drop, including when the
/// serving task unwinds from a panicking handler
pub struct ConnectionSlot(Arc<AtomicUsize>);

impl ConnectionSlot {
    /// Claim a slot, or `None` when `limit` slots are already taken
    pub fn acquire(counter: &Arc<AtomicUsize>, limit: Option<u64>) -> Option<Self> {
        // Increment first, then check, so concurrent accepts cannot both slip under the limit
        let prev_count = counter.fetch_add(1, Ordering::SeqCst);
        let slot = Self(Arc::clone(counter));
        match limit {
            Some(max_conn) if prev_count >= usize::try_from(max_conn).unwrap_or(usize::MAX) => {
                logger::log_warning(&format!(
                    "Max connections reached: {prev_count}/{max_conn}. Connection rejected."
                ));
                None
            }
            _ => Some(slot),
        }
    }
}

impl Drop for ConnectionSlot {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Accept a connection, enforcing the connection limit, and serve it in a
/// spawned task.
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    router: &Arc<Router>,
    options: &Arc<ServeOptions>,
    conn_counter: &Arc<AtomicUsize>,
) {
    let Some(slot) = ConnectionSlot::acquire(conn_counter, options.performance.max_connections)
    else {
        drop(stream);
        return;
    };

    logger::log_connection_accepted(&peer_addr);
    if let Err(e) = stream.set_nodelay(true) {
        logger::log_debug(&format!("Could not set TCP_NODELAY for {peer_addr}: {e}"));
    }

    handle_connection(
        stream,
        peer_addr,
        Arc::clone(router),
        Arc::clone(options),
        slot,
    );
}

/// Serve one connection until it closes or times out, then release its slot
fn handle_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    router: Arc<Router>,
    options: Arc<ServeOptions>,
    slot: ConnectionSlot,
) {
    tokio::spawn(async move {
        let _slot = slot;
        let io = TokioIo::new(stream);

        let timeout_duration = Duration::from_secs(std::cmp::max(
            options.performance.read_timeout,
            options.performance.write_timeout,
        ));

        let mut builder = http1::Builder::new();
        builder.keep_alive(options.performance.keep_alive_timeout > 0);

        let service_options = Arc::clone(&options);
        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let router = Arc::clone(&router);
                let options = Arc::clone(&service_options);
                async move {
                    Ok::<_, Infallible>(handle_request(req, &router, &options, peer_addr).await)
                }
            }),
        );

        match tokio::time::timeout(timeout_duration, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => logger::log_connection_error(&err),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout_duration.as_secs()
                ));
            }
        }
    });
}

/// Transport-side handling of one request: build the view, dispatch, stamp
/// the `Server` header and write the access log line.
pub async fn handle_request<B>(
    req: Request<B>,
    router: &Router,
    options: &ServeOptions,
    peer_addr: SocketAddr,
) -> Response<Full<Bytes>> {
    let started = Instant::now();
    logger::log_request(req.method(), req.uri(), req.version());

    let view = RequestView::from_parts(req.method().clone(), req.uri().path(), req.headers());
    let mut response = router.dispatch(view).await;

    match HeaderValue::from_str(&options.server_name) {
        Ok(value) => {
            response.headers_mut().insert(SERVER, value);
        }
        Err(e) => logger::log_debug(&format!("Invalid server_name header value: {e}")),
    }

    if options.access_log {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().to_string(),
            req.uri().path().to_string(),
        );
        entry.query = req.uri().query().map(ToString::to_string);
        entry.http_version = version_label(req.version()).to_string();
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.referer = header_string(&req, "referer");
        entry.user_agent = header_string(&req, "user-agent");
        entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &options.access_log_format);
    }

    response
}

fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::static_files::tests::temp_dir;
    use http_body_util::BodyExt;

    fn peer() -> SocketAddr {
        "127.0.0.1:50000".parse().unwrap()
    }

    #[tokio::test]
    async fn test_query_string_not_part_of_path() {
        let mut router = Router::with_static_root(temp_dir("conn_query"), "/public");
        router.get("/search/:term", |req, res| {
            res.send(200, req.param("term").unwrap_or_default().to_string());
        });

        let req = Request::builder()
            .method("GET")
            .uri("/search/rust?page=2")
            .body(())
            .unwrap();
        let response = handle_request(req, &router, &ServeOptions::default(), peer()).await;

        assert_eq!(response.status(), 200);
        assert_eq!(response.headers()[SERVER], ServeOptions::default().server_name);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"rust");
    }

    #[tokio::test]
    async fn test_headers_reach_handler() {
        let mut router = Router::with_static_root(temp_dir("conn_headers"), "/public");
        router.post("/echo-agent", |req, res| {
            res.send(200, req.header("user-agent").unwrap_or("-").to_string());
        });

        let req = Request::builder()
            .method("POST")
            .uri("/echo-agent")
            .header("User-Agent", "test-agent/1.0")
            .body(())
            .unwrap();
        let options = ServeOptions {
            access_log: false,
            ..ServeOptions::default()
        };
        let response = handle_request(req, &router, &options, peer()).await;
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), b"test-agent/1.0");
    }

    #[test]
    fn test_slot_released_on_drop() {
        let counter = Arc::new(AtomicUsize::new(0));
        let first = ConnectionSlot::acquire(&counter, Some(1)).unwrap();
        assert!(ConnectionSlot::acquire(&counter, Some(1)).is_none());
        assert_eq!(counter.load(Ordering::SeqCst), 1);

        drop(first);
        assert_eq!(counter.load(Ordering::SeqCst), 0);
        assert!(ConnectionSlot::acquire(&counter, Some(1)).is_some());
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_version_label() {
        assert_eq!(version_label(Version::HTTP_11), "1.1");
        assert_eq!(version_label(Version::HTTP_10), "1.0");
        assert_eq!(version_label(Version::HTTP_2), "2");
    }
}
