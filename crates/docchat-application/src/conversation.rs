//! Lifecycle of the single active conversation.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use docchat_core::api::{ApiClient, EVENT_STREAM_MEDIA_TYPE};
use docchat_core::conversation::{ChatEvent, ConversationCreated, CreateConversationRequest};
use docchat_core::error::{DocchatError, Result};
use docchat_core::stream::EventStream;
use futures::Stream;
use serde_json::Value;

use crate::base_url::SharedBaseUrl;

const NO_ACTIVE_CONVERSATION: &str =
    "No active conversation. Use /create to start a new conversation.";
const NO_CONVERSATION_TO_DELETE: &str = "No active conversation to delete.";

/// Owns the id of the active conversation and the documents the next one
/// will be bound to.
///
/// `conversation_id` goes from `None` to `Some` on a successful create and
/// back to `None` on a successful delete. Failed operations never touch it.
pub struct Conversation {
    client: Arc<dyn ApiClient>,
    base_url: SharedBaseUrl,
    conversation_id: Option<i64>,
    document_ids: Vec<i64>,
}

impl Conversation {
    pub fn new(client: Arc<dyn ApiClient>, base_url: SharedBaseUrl) -> Self {
        Self {
            client,
            base_url,
            conversation_id: None,
            document_ids: Vec::new(),
        }
    }

    pub fn conversation_id(&self) -> Option<i64> {
        self.conversation_id
    }

    pub fn document_ids(&self) -> &[i64] {
        &self.document_ids
    }

    /// Sets the documents attached to the next created conversation.
    pub fn bind_documents(&mut self, ids: Vec<i64>) {
        tracing::debug!(?ids, "documents bound to conversation");
        self.document_ids = ids;
    }

    /// Creates a conversation bound to the current `document_ids` and returns its id.
    pub async fn create(&mut self) -> Result<i64> {
        const OPERATION: &str = "create conversation";

        let body = serde_json::to_value(CreateConversationRequest {
            document_ids: self.document_ids.clone(),
        })?;
        let response = self
            .client
            .post(&self.base_url.endpoint("/api/conversation/"), &body)
            .await?;
        if response.status != 200 {
            tracing::warn!(status = response.status, "conversation create rejected");
            return Err(response.into_error(OPERATION));
        }

        let created: ConversationCreated = response.json()?;
        self.conversation_id = Some(created.id);
        tracing::info!(conversation_id = created.id, "conversation created");
        Ok(created.id)
    }

    /// Retrieves the full JSON detail of the active conversation.
    pub async fn detail(&self) -> Result<Value> {
        let id = self.active_id(NO_ACTIVE_CONVERSATION)?;
        let response = self.client.get(&self.conversation_url(id)).await?;
        if response.status != 200 {
            return Err(response.into_error("conversation detail"));
        }
        response.json()
    }

    /// Deletes the active conversation and returns the id that was removed.
    pub async fn delete(&mut self) -> Result<i64> {
        let id = self.active_id(NO_CONVERSATION_TO_DELETE)?;
        let response = self.client.delete(&self.conversation_url(id)).await?;
        if response.status != 204 {
            tracing::warn!(
                conversation_id = id,
                status = response.status,
                "conversation delete rejected"
            );
            return Err(response.into_error("delete conversation"));
        }

        self.conversation_id = None;
        tracing::info!(conversation_id = id, "conversation deleted");
        Ok(id)
    }

    /// Sends `text` and returns the streamed reply events.
    ///
    /// The text travels percent-encoded in the `user_message` query parameter.
    pub async fn send_message(&self, text: &str) -> Result<MessageStream> {
        let id = self.active_id(NO_ACTIVE_CONVERSATION)?;
        let url = format!(
            "{}/message?user_message={}",
            self.conversation_url(id),
            urlencoding::encode(text)
        );

        let events = self
            .client
            .open_event_stream(&url, &[("Accept", EVENT_STREAM_MEDIA_TYPE)])
            .await?;
        tracing::debug!(conversation_id = id, "message stream opened");
        Ok(MessageStream {
            conversation_id: id,
            events,
        })
    }

    fn active_id(&self, notice: &str) -> Result<i64> {
        self.conversation_id
            .ok_or_else(|| DocchatError::precondition(notice))
    }

    fn conversation_url(&self, id: i64) -> String {
        self.base_url
            .endpoint(&format!("/api/conversation/{}", id))
    }
}

/// Reply events for one sent message, in arrival order.
///
/// A payload that is not valid JSON yields an error item for that event only;
/// the stream continues with the next one.
#[derive(Debug)]
pub struct MessageStream {
    conversation_id: i64,
    events: EventStream,
}

impl MessageStream {
    pub fn conversation_id(&self) -> i64 {
        self.conversation_id
    }

    pub async fn next(&mut self) -> Option<Result<ChatEvent>> {
        let item = self.events.next().await?;
        Some(item.and_then(|payload| ChatEvent::parse(&payload)))
    }

    /// Stops the stream and closes the underlying connection.
    pub fn cancel(&mut self) {
        tracing::debug!(conversation_id = self.conversation_id, "message stream cancelled");
        self.events.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.events.is_cancelled()
    }
}

impl Stream for MessageStream {
    type Item = Result<ChatEvent>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events)
            .poll_next(cx)
            .map(|item| item.map(|item| item.and_then(|payload| ChatEvent::parse(&payload))))
    }
}
