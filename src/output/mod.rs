//! Output module
//!
//! Streams signal results to a browser effects layer over HTTP/SSE.

pub mod sse;
