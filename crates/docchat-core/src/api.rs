//! The transport seam between the conversation workflow and the backend.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{DocchatError, Result};
use crate::stream::EventStream;

/// Media type requested when opening an event stream.
pub const EVENT_STREAM_MEDIA_TYPE: &str = "text/event-stream";

/// Raw outcome of a completed request: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Converts an unexpected status into a [`DocchatError::Backend`] for `operation`.
    pub fn into_error(self, operation: &'static str) -> DocchatError {
        DocchatError::backend(operation, self.status, self.body)
    }
}

/// HTTP operations the client needs from the backend.
///
/// `get`, `post`, and `delete` only fail on transport problems; a non-2xx
/// status is a normal [`ApiResponse`] the caller branches on.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(&self, url: &str) -> Result<ApiResponse>;

    async fn post(&self, url: &str, body: &Value) -> Result<ApiResponse>;

    async fn delete(&self, url: &str) -> Result<ApiResponse>;

    /// Opens a persistent request and returns its events as they arrive.
    async fn open_event_stream(&self, url: &str, headers: &[(&str, &str)]) -> Result<EventStream>;
}
