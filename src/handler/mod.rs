//! Request handler module
//!
//! Owns the route and static mount tables and turns each request into exactly
//! one response: a static file, a route handler's output, or a not-found page.

pub mod router;
pub mod static_files;

// Re-export main entry points
pub use router::{Handler, Outcome, RouteEntry, Router, DEFAULT_MOUNT};
pub use static_files::{MountCallback, StaticMount};
