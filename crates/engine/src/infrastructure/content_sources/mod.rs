//! Content source implementations for catalog data.

mod files;
mod http;

pub use files::FileContentSource;
pub use http::HttpContentSource;
