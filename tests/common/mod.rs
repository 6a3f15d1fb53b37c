#![allow(dead_code)]

use async_trait::async_trait;
use reward_consumer::domain::message::{RawMessage, ReceiptHandle};
use reward_consumer::domain::ports::{MessageQueue, ReceiveRequest, TransactionSink};
use reward_consumer::domain::transaction::Transaction;
use reward_consumer::error::{QueueError, SinkError};
use reward_consumer::infrastructure::in_memory::InMemoryQueue;
use reward_consumer::interfaces::json::envelope::wrap_payload;
use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

pub fn payload(transaction_id: &str) -> String {
    format!(
        r#"{{"transactionId":"{transaction_id}","userId":"u1","amount":12.50,"merchantId":"m1","category":"dining","timestamp":"2024-05-01T12:00:00Z","status":"COMPLETED"}}"#
    )
}

pub fn envelope(transaction_id: &str) -> String {
    wrap_payload(&payload(transaction_id))
}

/// Records every transaction it sees and rejects the configured ids.
#[derive(Default)]
pub struct RecordingSink {
    seen: Mutex<Vec<Transaction>>,
    reject: HashSet<String>,
    /// Number of initial calls that fail regardless of id.
    fail_first: AtomicUsize,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(ids: &[&str]) -> Self {
        Self {
            reject: ids.iter().map(|id| id.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_first(calls: usize) -> Self {
        Self {
            fail_first: AtomicUsize::new(calls),
            ..Self::default()
        }
    }

    pub fn seen(&self) -> Vec<Transaction> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionSink for RecordingSink {
    async fn process(&self, transaction: &Transaction) -> Result<(), SinkError> {
        self.seen.lock().unwrap().push(transaction.clone());
        let fail_now = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if fail_now || self.reject.contains(transaction.transaction_id.as_str()) {
            return Err(format!("rejected {}", transaction.transaction_id).into());
        }
        Ok(())
    }
}

/// Wraps an [`InMemoryQueue`] and records every delete call.
#[derive(Default)]
pub struct RecordingQueue {
    pub inner: InMemoryQueue,
    deletes: Mutex<Vec<ReceiptHandle>>,
    fail_deletes: AtomicBool,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub fn deletes(&self) -> Vec<ReceiptHandle> {
        self.deletes.lock().unwrap().clone()
    }
}

#[async_trait]
impl MessageQueue for RecordingQueue {
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError> {
        self.inner.receive(request).await
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.deletes.lock().unwrap().push(receipt.clone());
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(QueueError::Provider("delete throttled".into()));
        }
        self.inner.delete(receipt).await
    }
}
