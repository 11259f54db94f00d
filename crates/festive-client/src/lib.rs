//! HTTP transport for the festive dashboard engine.
//!
//! [`HttpBackend`] speaks the analytics service's REST API and classifies
//! every failure as `NetworkFailure` (no usable response) or `BadResponse`
//! (non-2xx status, or a body that does not decode). It never returns
//! partial results.

mod error;
pub mod http;

pub use http::HttpBackend;
