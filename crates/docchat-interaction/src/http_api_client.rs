//! HttpApiClient - reqwest implementation of [`ApiClient`].
//!
//! Plain requests are bounded by a per-request timeout. Event streams are
//! handed to a relay task that decodes frames as bytes arrive and forwards
//! each payload to the caller's [`EventStream`]; the relay drops the response
//! (closing the connection) when the consumer cancels or goes away.

use std::time::Duration;

use async_trait::async_trait;
use docchat_core::api::{ApiClient, ApiResponse};
use docchat_core::config::ClientConfig;
use docchat_core::error::{DocchatError, Result};
use docchat_core::sse::SseDecoder;
use docchat_core::stream::{DEFAULT_STREAM_BUFFER, EventSender, EventStream};
use futures::StreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

/// Backend client speaking plain HTTP and `text/event-stream`.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    request_timeout: Duration,
    stream_idle_timeout: Duration,
}

impl HttpApiClient {
    /// Creates a client with default timeouts.
    pub fn new() -> Result<Self> {
        Self::from_config(&ClientConfig::default())
    }

    /// Creates a client using the timeouts in `config`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| DocchatError::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            request_timeout: config.request_timeout(),
            stream_idle_timeout: config.stream_idle_timeout(),
        })
    }

    /// Overrides the timeout for plain requests and for stream response headers.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Overrides the idle timeout applied between stream chunks.
    pub fn with_stream_idle_timeout(mut self, timeout: Duration) -> Self {
        self.stream_idle_timeout = timeout;
        self
    }

    async fn execute(
        &self,
        operation: &'static str,
        request: RequestBuilder,
    ) -> Result<ApiResponse> {
        let response = request
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| transport_error(operation, e))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| transport_error(operation, e))?;

        tracing::debug!(operation, status, "request completed");
        Ok(ApiResponse::new(status, body))
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn get(&self, url: &str) -> Result<ApiResponse> {
        tracing::debug!(method = "GET", url, "sending request");
        self.execute("GET request", self.client.get(url)).await
    }

    async fn post(&self, url: &str, body: &Value) -> Result<ApiResponse> {
        tracing::debug!(method = "POST", url, "sending request");
        self.execute("POST request", self.client.post(url).json(body)).await
    }

    async fn delete(&self, url: &str) -> Result<ApiResponse> {
        tracing::debug!(method = "DELETE", url, "sending request");
        self.execute("DELETE request", self.client.delete(url)).await
    }

    async fn open_event_stream(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<EventStream> {
        const OPERATION: &str = "open event stream";
        tracing::debug!(method = "GET", url, "opening event stream");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        // The idle timeout only covers the body; bound the wait for headers here.
        let response = tokio::time::timeout(self.request_timeout, request.send())
            .await
            .map_err(|_| {
                tracing::warn!(
                    timeout_secs = self.request_timeout.as_secs_f64(),
                    "event stream headers not received"
                );
                DocchatError::transport(
                    OPERATION,
                    format!("no response headers within {:?}", self.request_timeout),
                )
            })?
            .map_err(|e| transport_error(OPERATION, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Ok(body) => body,
                Err(error) => format!(
                    "{} (body unreadable: {})",
                    status.canonical_reason().unwrap_or("unknown status"),
                    error
                ),
            };
            tracing::warn!(status = status.as_u16(), "event stream rejected");
            return Err(DocchatError::backend(OPERATION, status.as_u16(), body));
        }

        let (sender, stream) = EventStream::channel(DEFAULT_STREAM_BUFFER);
        tokio::spawn(relay_events(response, sender, self.stream_idle_timeout));
        Ok(stream)
    }
}

/// Reads the response body until it ends, fails, idles out, or the consumer cancels.
async fn relay_events(response: Response, sender: EventSender, idle_timeout: Duration) {
    const OPERATION: &str = "read event stream";

    let mut bytes_stream = response.bytes_stream();
    let mut decoder = SseDecoder::new();

    loop {
        let next_chunk = tokio::select! {
            _ = sender.cancelled() => {
                tracing::debug!("event stream cancelled by consumer");
                return;
            }
            next = tokio::time::timeout(idle_timeout, bytes_stream.next()) => next,
        };

        let chunk = match next_chunk {
            Ok(Some(Ok(chunk))) => chunk,
            Ok(Some(Err(error))) => {
                tracing::warn!(%error, "event stream read failed");
                let _ = sender.send(Err(transport_error(OPERATION, error))).await;
                return;
            }
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = idle_timeout.as_secs(),
                    "event stream idle timeout"
                );
                let message = format!("no data received for {}s", idle_timeout.as_secs());
                let _ = sender
                    .send(Err(DocchatError::transport(OPERATION, message)))
                    .await;
                return;
            }
        };

        for event in decoder.push(&chunk) {
            if !sender.send(Ok(event.data)).await {
                return;
            }
        }
    }

    if let Some(event) = decoder.finish() {
        let _ = sender.send(Ok(event.data)).await;
    }
    tracing::debug!("event stream closed by server");
}

fn transport_error(operation: &'static str, error: reqwest::Error) -> DocchatError {
    let message = if error.is_timeout() {
        format!("request timed out: {}", error)
    } else if error.is_connect() {
        format!("connection failed: {}", error)
    } else {
        error.to_string()
    };
    DocchatError::transport(operation, message)
}
