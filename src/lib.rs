//! Guestbook: a small REST API for signing and reading a guestbook, plus a
//! terminal client for it.
//!
//! # API
//!
//! ```text
//! GET  /health    -> {"status":"OK","timestamp":"..."}
//! GET  /messages  -> {"success":true,"count":N,"messages":[...]}   newest first
//! POST /messages  <- {"name":"Ada","message":"Hello!"}
//!                 -> 201 {"success":true,"message":{"id":1,...}}
//! ```
//!
//! Every failure uses the envelope `{"success":false,"error":"..."}`.
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`message`]: Message model and validation
//! - [`store`]: Storage trait, PostgreSQL and in-memory stores
//! - [`api`]: HTTP API (axum)
//! - [`client`]: API client and list/form state
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod metrics;
pub mod store;
pub mod utils;

pub use config::Config;
pub use error::{GuestbookError, Result};
