//! HTTP API: routing, request/response mapping, bearer-token guard.

pub mod app;
pub mod authz;
pub mod context;
pub mod middleware;
