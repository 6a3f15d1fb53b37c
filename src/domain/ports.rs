use super::message::{RawMessage, ReceiptHandle};
use super::transaction::Transaction;
use crate::error::{QueueError, SinkError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Parameters for a single batch receive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveRequest {
    /// Upper bound on the number of messages returned.
    pub max_messages: u32,
    /// How long the provider may hold the call open waiting for messages.
    pub wait_time: Duration,
    /// How long received messages stay hidden from other receivers.
    pub visibility_timeout: Duration,
}

/// A durable queue with at-least-once delivery and visibility-timeout redelivery.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    /// Receives up to `request.max_messages` messages, possibly none.
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError>;

    /// Permanently removes the message delivered with `receipt`.
    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError>;
}

/// Business logic invoked once per decoded transaction.
///
/// Messages are redelivered after failures and after lost acknowledgements,
/// so implementations must tolerate seeing the same transaction more than once.
#[async_trait]
pub trait TransactionSink: Send + Sync {
    async fn process(&self, transaction: &Transaction) -> Result<(), SinkError>;
}

pub type MessageQueueRef = Arc<dyn MessageQueue>;
pub type TransactionSinkRef = Arc<dyn TransactionSink>;
