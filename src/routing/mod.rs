//! Routing module
//!
//! Route template compilation and path parameter extraction:
//! - `/literal/segments` match exactly
//! - `/:name` segments capture one non-empty path segment
//! - `*` matches every path

mod params;
mod pattern;

pub use params::{extract_params, Params};
pub use pattern::{CompiledPattern, Segment, WILDCARD};
