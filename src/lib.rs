//! Minimal HTTP request-dispatch layer
//!
//! Register method + path handlers on a [`Router`], mount static directories,
//! and serve them over hyper:
//!
//! ```no_run
//! use rust_router::Router;
//!
//! # async fn run() -> std::io::Result<()> {
//! let mut app = Router::new();
//! app.get("/user/:id", |req, res| {
//!     res.send(200, format!("user {}", req.param("id").unwrap_or("?")));
//! });
//! app.listen(3000, |addr| println!("listening on {addr}")).await
//! # }
//! ```

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod routing;
pub mod server;

pub use handler::Router;
pub use http::{Payload, RequestView, ResponseWriter};
