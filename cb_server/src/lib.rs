//! HTTP server for charmbook pages and charms.
//!
//! Exposes the router and its supporting configuration, logging and metrics
//! modules so the binary and the integration tests build the same service.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;
