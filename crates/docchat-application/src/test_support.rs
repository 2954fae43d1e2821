//! Scripted [`ApiClient`] used by the unit tests in this crate.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use docchat_core::api::{ApiClient, ApiResponse};
use docchat_core::error::{DocchatError, Result};
use docchat_core::stream::EventStream;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: &'static str,
    pub url: String,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

/// Returns queued responses in order and records every call it receives.
#[derive(Default)]
pub struct MockApiClient {
    responses: Mutex<VecDeque<Result<ApiResponse>>>,
    streams: Mutex<VecDeque<Result<Vec<Result<String>>>>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockApiClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, status: u16, body: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(ApiResponse::new(status, body)));
        self
    }

    pub fn fail(self, error: DocchatError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    pub fn stream(self, payloads: Vec<Result<String>>) -> Self {
        self.streams.lock().unwrap().push_back(Ok(payloads));
        self
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(
        &self,
        method: &'static str,
        url: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            url: url.to_string(),
            body,
            headers: headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
    }

    fn next_response(&self) -> Result<ApiResponse> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted response left")
    }
}

#[async_trait]
impl ApiClient for MockApiClient {
    async fn get(&self, url: &str) -> Result<ApiResponse> {
        self.record("GET", url, None, &[]);
        self.next_response()
    }

    async fn post(&self, url: &str, body: &Value) -> Result<ApiResponse> {
        self.record("POST", url, Some(body.clone()), &[]);
        self.next_response()
    }

    async fn delete(&self, url: &str) -> Result<ApiResponse> {
        self.record("DELETE", url, None, &[]);
        self.next_response()
    }

    async fn open_event_stream(
        &self,
        url: &str,
        headers: &[(&str, &str)],
    ) -> Result<EventStream> {
        self.record("STREAM", url, None, headers);
        let payloads = self
            .streams
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted stream left")?;
        Ok(EventStream::from_items(payloads))
    }
}

/// JSON array of `count` documents with ids `1..=count`.
pub fn documents_json(count: i64) -> String {
    let docs: Vec<Value> = (1..=count)
        .map(|id| serde_json::json!({"id": id, "url": format!("https://example.com/{id}.pdf")}))
        .collect();
    Value::Array(docs).to_string()
}
