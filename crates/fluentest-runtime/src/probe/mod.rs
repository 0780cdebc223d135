//! HTTP readiness probing.

mod http;

pub use http::HttpReadinessProbe;
