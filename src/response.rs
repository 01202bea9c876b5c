//! Response types returned by the render endpoints and webhook callbacks

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Returned by `screenshot_async` once the API has accepted a webhook render
pub const ASYNC_ACCEPTED_MESSAGE: &str =
    "render accepted: the result will be posted to the webhook url";

/// Raw HTTP response as handed back by a [`crate::Transport`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// `Content-Type` header, if the server sent one
    pub content_type: Option<String>,
    /// Response body bytes (image, video, document or JSON)
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body decoded as UTF-8
    pub fn text(&self) -> Result<String> {
        String::from_utf8(self.body.clone())
            .map_err(|e| Error::Decode(format!("response body is not valid UTF-8: {}", e)))
    }

    /// Body decoded as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| Error::Decode(format!("unable to unmarshal response body: {}", e)))
    }
}

/// Location and size of a finished render
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResult {
    pub render_url: String,
    /// Size of the rendered file in bytes
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderMeta {
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
}

/// Payload the service POSTs to the webhook URL when a render completes.
///
/// ```
/// let body = br#"{
///     "event": "render.succeeded",
///     "renderId": "19a59ab6-a5aa-4cde-86cb-d2b23302fd84",
///     "result": { "renderUrl": "https://renders.urlbox.io/r/shot.png", "size": 34097 },
///     "meta": { "startTime": "2024-01-11T17:49:18.593Z", "endTime": "2024-01-11T17:49:21.103Z" }
/// }"#;
/// let event = urlbox::WebhookEvent::from_slice(body).unwrap();
/// assert!(event.is_success());
/// assert_eq!(event.result.size, 34097);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    pub event: String,
    pub render_id: String,
    pub result: RenderResult,
    #[serde(default)]
    pub meta: RenderMeta,
}

impl WebhookEvent {
    /// Decode a webhook callback body
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body)
            .map_err(|e| Error::Decode(format!("unable to unmarshal webhook event: {}", e)))
    }

    pub fn is_success(&self) -> bool {
        self.event.ends_with(".succeeded")
    }
}
