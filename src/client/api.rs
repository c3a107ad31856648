//! Guestbook API client wrapper.

use std::time::Duration;

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use crate::api::{CreatedMessageResponse, MessageListResponse};
use crate::error::ClientError;
use crate::message::{CreateMessageRequest, Message};

/// Error body as sent by the API; every field optional so any JSON parses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the guestbook API.
#[derive(Debug, Clone)]
pub struct GuestbookClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// API base URL, always ending in `/`.
    base_url: Url,
}

impl GuestbookClient {
    /// Create a client for the API at `base_url`.
    pub fn new(mut base_url: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { http, base_url })
    }

    /// API base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.base_url.join(path)?)
    }

    /// Fetch every message, newest first.
    #[instrument(skip(self))]
    pub async fn fetch_messages(&self) -> Result<Vec<Message>, ClientError> {
        let url = self.endpoint("messages")?;
        let response = self.http.get(url).send().await?;

        let list: MessageListResponse = read_envelope(response).await?;
        if !list.success {
            return Err(ClientError::Api {
                status: StatusCode::OK.as_u16(),
                error: None,
            });
        }

        debug!(count = list.count, "Fetched messages");
        Ok(list.messages)
    }

    /// Submit a new message. Fields are sent as entered; the server trims them.
    #[instrument(skip(self, request))]
    pub async fn create_message(
        &self,
        request: &CreateMessageRequest,
    ) -> Result<Message, ClientError> {
        let url = self.endpoint("messages")?;
        let response = self.http.post(url).json(request).send().await?;

        let created: CreatedMessageResponse = read_envelope(response).await?;
        if !created.success {
            return Err(ClientError::Api {
                status: StatusCode::CREATED.as_u16(),
                error: None,
            });
        }

        debug!(id = created.message.id, "Created message");
        Ok(created.message)
    }
}

/// Decode a success envelope, or turn the response into [`ClientError::Api`].
async fn read_envelope<T: DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, ClientError> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if status.is_success() {
        if let Ok(body) = serde_json::from_slice::<T>(&bytes) {
            return Ok(body);
        }
    }

    let error = serde_json::from_slice::<ErrorBody>(&bytes)
        .ok()
        .and_then(|body| body.error);

    Err(ClientError::Api {
        status: status.as_u16(),
        error,
    })
}
