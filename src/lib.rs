//! SEVENCAST — Seven-day stock price analysis and prediction service.
//!
//! Library crate exposing all modules for use by integration tests
//! and the binary entry points (`sevencast` server, `smoke` dispatcher).

pub mod config;
pub mod types;
pub mod estimator;
pub mod model;
pub mod server;
