// Server module entry point
// Binds the HTTP transport and feeds accepted requests to a router

pub mod connection;
pub mod listener;

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::{Config, PerformanceConfig};
use crate::handler::Router;
use crate::logger;

pub use listener::create_listener;

/// Transport settings applied to every connection
#[derive(Debug, Clone)]
pub struct ServeOptions {
    pub access_log: bool,
    pub access_log_format: String,
    /// Value of the `Server` response header
    pub server_name: String,
    pub performance: PerformanceConfig,
}

impl Default for ServeOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ServeOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            access_log: config.logging.access_log,
            access_log_format: config.logging.access_log_format.clone(),
            server_name: config.http.server_name.clone(),
            performance: config.performance.clone(),
        }
    }
}

/// Bind `addr`, call `on_ready` with the bound address, then serve forever.
///
/// The router is moved in: routes and mounts are fixed from here on and
/// shared read-only across connections.
pub async fn listen<F>(
    router: Router,
    addr: SocketAddr,
    options: ServeOptions,
    on_ready: F,
) -> std::io::Result<()>
where
    F: FnOnce(SocketAddr),
{
    let listener = create_listener(addr)?;
    on_ready(listener.local_addr()?);
    serve(listener, Arc::new(router), Arc::new(options)).await
}

/// Accept loop over an already bound listener
pub async fn serve(
    listener: TcpListener,
    router: Arc<Router>,
    options: Arc<ServeOptions>,
) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));
    loop {
        match listener.accept().await {
            Ok((stream, peer_addr)) => {
                connection::accept_connection(
                    stream,
                    peer_addr,
                    &router,
                    &options,
                    &active_connections,
                );
            }
            Err(e) => logger::log_error(&format!("Failed to accept connection: {e}")),
        }
    }
}

impl Router {
    /// Bind all interfaces on `port` with default transport settings
    pub async fn listen<F>(self, port: u16, on_ready: F) -> std::io::Result<()>
    where
        F: FnOnce(SocketAddr),
    {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        listen(self, addr, ServeOptions::default(), on_ready).await
    }
}
