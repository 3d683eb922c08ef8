//! HTTP API: router, enforcement middleware, and request/response mapping.

pub mod app;
pub mod authz;
pub mod middleware;
