//! Client-side guestbook state: message list, form, and rendering.

use std::fmt::Write as _;

use time::UtcOffset;
use tracing::warn;

use crate::error::ClientError;
use crate::message::{CreateMessageRequest, Message};
use crate::utils::{format_datetime, local_offset};

use super::api::GuestbookClient;

/// Shown when the list request never reached the server.
pub const CONNECT_FAILED: &str = "Failed to connect to server";
/// Shown when the server answered the list request with a failure.
pub const LOAD_FAILED: &str = "Failed to load messages";
/// Fallback when a submit fails without a server-provided reason.
pub const SUBMIT_FAILED: &str = "Failed to submit message";
/// Shown in place of the list when there are no messages.
pub const EMPTY_STATE: &str = "No messages yet. Be the first to sign the guestbook!";

/// Values currently typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormState {
    /// Author field.
    pub name: String,
    /// Message field.
    pub message: String,
}

impl FormState {
    fn to_request(&self) -> CreateMessageRequest {
        CreateMessageRequest::new(self.name.clone(), self.message.clone())
    }
}

/// Everything the guestbook screen shows.
#[derive(Debug, Clone)]
pub struct GuestbookView {
    messages: Vec<Message>,
    form: FormState,
    submitting: bool,
    error: Option<String>,
    offset: UtcOffset,
}

impl Default for GuestbookView {
    fn default() -> Self {
        Self::new()
    }
}

impl GuestbookView {
    /// Empty view rendering times in the local offset.
    pub fn new() -> Self {
        Self::with_offset(local_offset())
    }

    /// Empty view rendering times in a fixed offset.
    pub fn with_offset(offset: UtcOffset) -> Self {
        Self {
            messages: Vec::new(),
            form: FormState::default(),
            submitting: false,
            error: None,
            offset,
        }
    }

    /// Messages currently shown.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current form values.
    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Error currently shown, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether a create request is in flight.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Submit is disabled while a create request is in flight.
    pub fn can_submit(&self) -> bool {
        !self.submitting
    }

    /// Update the author field.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.form.name = name.into();
    }

    /// Update the message field.
    pub fn set_message(&mut self, message: impl Into<String>) {
        self.form.message = message.into();
    }

    /// Fetch the list from the API and apply the outcome.
    pub async fn load(&mut self, client: &GuestbookClient) {
        let result = client.fetch_messages().await;
        self.apply_load(result);
    }

    /// Apply the outcome of a list request.
    ///
    /// On failure the current list is kept, so a failed first load leaves it empty.
    pub fn apply_load(&mut self, result: Result<Vec<Message>, ClientError>) {
        match result {
            Ok(messages) => {
                self.messages = messages;
                self.error = None;
            }
            Err(ClientError::Http(e)) => {
                warn!("Error fetching messages: {}", e);
                self.error = Some(CONNECT_FAILED.to_string());
            }
            Err(e) => {
                warn!("Error fetching messages: {}", e);
                self.error = Some(LOAD_FAILED.to_string());
            }
        }
    }

    /// Mark a submit as started and return the request to send.
    ///
    /// Returns `None` while another submit is in flight.
    pub fn begin_submit(&mut self) -> Option<CreateMessageRequest> {
        if self.submitting {
            return None;
        }
        self.submitting = true;
        self.error = None;
        Some(self.form.to_request())
    }

    /// Apply the outcome of a create request. Returns true when the message was stored.
    pub fn finish_submit(&mut self, result: Result<Message, ClientError>) -> bool {
        self.submitting = false;

        match result {
            Ok(_) => {
                self.form = FormState::default();
                true
            }
            Err(e) => {
                warn!("Error submitting message: {}", e);
                let text = e.server_message().unwrap_or(SUBMIT_FAILED);
                self.error = Some(text.to_string());
                false
            }
        }
    }

    /// Send the form, then re-fetch the list on success.
    ///
    /// Returns true when the message was stored.
    pub async fn submit(&mut self, client: &GuestbookClient) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };

        let result = client.create_message(&request).await;
        let stored = self.finish_submit(result);
        if stored {
            self.load(client).await;
        }
        stored
    }

    /// Render the list as plain text.
    pub fn render(&self) -> String {
        let mut out = String::new();

        if let Some(error) = &self.error {
            writeln!(out, "! {}", error).ok();
            out.push('\n');
        }

        writeln!(out, "Messages ({})", self.messages.len()).ok();
        writeln!(out, "{}", "-".repeat(40)).ok();

        if self.messages.is_empty() {
            writeln!(out, "{}", EMPTY_STATE).ok();
            return out;
        }

        for message in &self.messages {
            writeln!(
                out,
                "{}  ({})",
                message.name,
                format_datetime(message.created_at, self.offset)
            )
            .ok();
            for line in message.message.lines() {
                writeln!(out, "    {}", line).ok();
            }
            out.push('\n');
        }

        out
    }
}
