use crate::domain::message::{RawMessage, ReceiptHandle};
use crate::domain::ports::{MessageQueue, ReceiveRequest};
use crate::error::QueueError;
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;
use uuid::Uuid;

#[derive(Debug)]
struct StoredMessage {
    message_id: String,
    body: String,
    visible_at: Instant,
    /// Handle of the current delivery, if the message was ever received.
    receipt: Option<ReceiptHandle>,
}

/// A thread-safe in-memory queue with visibility-timeout semantics.
///
/// Received messages stay hidden for the requested visibility timeout and
/// reappear if they are not deleted in time. Every delivery gets a fresh
/// receipt handle and only the latest one can delete the message.
///
/// Time comes from `tokio::time`, so tests can drive redelivery with a paused
/// clock.
#[derive(Default, Clone)]
pub struct InMemoryQueue {
    messages: Arc<Mutex<Vec<StoredMessage>>>,
    arrivals: Arc<Notify>,
}

impl InMemoryQueue {
    /// Creates a new, empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a body and returns its message id.
    pub async fn send(&self, body: impl Into<String>) -> String {
        let message_id = Uuid::new_v4().to_string();
        self.messages.lock().await.push(StoredMessage {
            message_id: message_id.clone(),
            body: body.into(),
            visible_at: Instant::now(),
            receipt: None,
        });
        self.arrivals.notify_waiters();
        message_id
    }

    /// Number of messages not yet deleted, visible or not.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Number of messages currently hidden by an unexpired visibility timeout.
    pub async fn in_flight(&self) -> usize {
        let now = Instant::now();
        self.messages
            .lock()
            .await
            .iter()
            .filter(|m| m.visible_at > now)
            .count()
    }

    async fn take_visible(&self, request: &ReceiveRequest) -> (Vec<RawMessage>, Option<Instant>) {
        let now = Instant::now();
        let mut messages = self.messages.lock().await;
        let mut batch = Vec::new();

        for stored in messages.iter_mut() {
            if batch.len() >= request.max_messages as usize {
                break;
            }
            if stored.visible_at > now {
                continue;
            }
            let receipt = ReceiptHandle::new(Uuid::new_v4().to_string());
            stored.visible_at = now + request.visibility_timeout;
            stored.receipt = Some(receipt.clone());
            batch.push(RawMessage::new(
                stored.message_id.clone(),
                receipt,
                stored.body.clone(),
            ));
        }

        let next_visible = messages
            .iter()
            .map(|m| m.visible_at)
            .filter(|at| *at > now)
            .min();
        (batch, next_visible)
    }
}

#[async_trait]
impl MessageQueue for InMemoryQueue {
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError> {
        let deadline = Instant::now() + request.wait_time;
        loop {
            // Register for wake-ups before looking, so a send in between is not missed.
            let arrived = self.arrivals.notified();
            let (batch, next_visible) = self.take_visible(request).await;
            if !batch.is_empty() || Instant::now() >= deadline {
                return Ok(batch);
            }
            let wake_at = next_visible.map_or(deadline, |at| at.min(deadline));
            tokio::select! {
                _ = arrived => {}
                _ = tokio::time::sleep_until(wake_at) => {}
            }
        }
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        let mut messages = self.messages.lock().await;
        let position = messages
            .iter()
            .position(|m| m.receipt.as_ref() == Some(receipt))
            .ok_or_else(|| QueueError::UnknownReceipt(receipt.to_string()))?;
        messages.remove(position);
        Ok(())
    }
}
