//! Single-consumer handle over a server-pushed event stream.
//!
//! A producer task owns the underlying connection and forwards one payload
//! per event through a bounded channel. The consumer side is [`EventStream`];
//! cancelling or dropping it fires a [`CancellationToken`] the producer
//! watches, so the connection is released on every exit path.

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::error::Result;

/// Default capacity of the relay channel.
pub const DEFAULT_STREAM_BUFFER: usize = 32;

/// Producer half handed to the task that reads the connection.
#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Result<String>>,
    cancel: CancellationToken,
}

impl EventSender {
    /// Forwards one item. Returns `false` once the consumer is gone.
    pub async fn send(&self, item: Result<String>) -> bool {
        if self.cancel.is_cancelled() {
            return false;
        }
        self.sender.send(item).await.is_ok()
    }

    /// Resolves when the consumer cancels or drops the stream.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Lazy, singly-consumable sequence of event payloads.
#[derive(Debug)]
pub struct EventStream {
    receiver: mpsc::Receiver<Result<String>>,
    cancel: CancellationToken,
}

impl EventStream {
    /// Creates a connected producer/consumer pair.
    pub fn channel(buffer: usize) -> (EventSender, EventStream) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let cancel = CancellationToken::new();
        (
            EventSender {
                sender,
                cancel: cancel.clone(),
            },
            EventStream { receiver, cancel },
        )
    }

    /// Builds an already-complete stream from a fixed list of items.
    pub fn from_items(items: Vec<Result<String>>) -> Self {
        let (sender, stream) = Self::channel(items.len());
        for item in items {
            // Capacity equals the item count, so this cannot fail.
            let _ = sender.sender.try_send(item);
        }
        stream
    }

    /// Waits for the next payload. `None` once the stream has ended or was cancelled.
    pub async fn next(&mut self) -> Option<Result<String>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        self.receiver.recv().await
    }

    /// Stops consumption and tells the producer to release the connection.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.receiver.close();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Stream for EventStream {
    type Item = Result<String>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.cancel.is_cancelled() {
            return Poll::Ready(None);
        }
        self.receiver.poll_recv(cx)
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
