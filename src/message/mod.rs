//! Guestbook message model and input validation.

pub mod types;
pub mod validation;

pub use types::{CreateMessageRequest, Message, NewMessage};
pub use validation::{validate, MESSAGE_MAX_LEN, NAME_MAX_LEN};
