//! Input validation for new guestbook messages.

use crate::error::ValidationError;

use super::types::{CreateMessageRequest, NewMessage};

/// Maximum author label length, in characters.
pub const NAME_MAX_LEN: usize = 100;

/// Maximum message body length, in characters.
pub const MESSAGE_MAX_LEN: usize = 1000;

/// Validate and trim a create request.
///
/// Whitespace-only input counts as missing. Length limits apply to the
/// values as submitted, before trimming.
pub fn validate(request: &CreateMessageRequest) -> Result<NewMessage, ValidationError> {
    let raw_name = request.name.as_deref().unwrap_or_default();
    let raw_message = request.message.as_deref().unwrap_or_default();
    let name = raw_name.trim();
    let message = raw_message.trim();

    if name.is_empty() || message.is_empty() {
        return Err(ValidationError::MissingFields);
    }

    if raw_name.chars().count() > NAME_MAX_LEN {
        return Err(ValidationError::NameTooLong);
    }

    if raw_message.chars().count() > MESSAGE_MAX_LEN {
        return Err(ValidationError::MessageTooLong);
    }

    Ok(NewMessage {
        name: name.to_string(),
        message: message.to_string(),
    })
}
