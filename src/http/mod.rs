//! HTTP protocol layer module
//!
//! Request view, response writer and response builders shared by the
//! dispatcher and route handlers.

pub mod mime;
pub mod request;
pub mod response;
pub mod writer;

// Re-export commonly used types
pub use request::RequestView;
pub use response::{
    build_404_page_response, build_404_text_response, build_500_response,
    build_file_response, build_homepage_response,
};
pub use writer::{Payload, ResponseWriter};
