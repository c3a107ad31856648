//! Guestbook client application.
//!
//! This module handles:
//! - HTTP access to the guestbook API
//! - Form and list state, including the in-flight submit guard
//! - Plain-text rendering of the list

pub mod api;
pub mod view;

pub use api::GuestbookClient;
pub use view::{FormState, GuestbookView};
