use super::worker::{MessageState, Stage};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters for the whole pipeline, shared by every cycle.
#[derive(Debug, Default)]
pub struct PipelineStats {
    received: AtomicU64,
    acknowledged: AtomicU64,
    decode_failures: AtomicU64,
    processing_failures: AtomicU64,
    acknowledge_failures: AtomicU64,
    dispatch_failures: AtomicU64,
    receive_errors: AtomicU64,
}

/// A point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub received: u64,
    pub acknowledged: u64,
    pub decode_failures: u64,
    pub processing_failures: u64,
    pub acknowledge_failures: u64,
    pub dispatch_failures: u64,
    pub receive_errors: u64,
}

impl StatsSnapshot {
    /// Messages that were received but left on the queue.
    pub fn failed(&self) -> u64 {
        self.decode_failures
            + self.processing_failures
            + self.acknowledge_failures
            + self.dispatch_failures
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_received(&self, count: usize) {
        self.received.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_receive_error(&self) {
        self.receive_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_outcome(&self, state: MessageState) {
        let counter = match state {
            MessageState::Acknowledged => &self.acknowledged,
            MessageState::Failed(Stage::Unwrap | Stage::Decode) => &self.decode_failures,
            MessageState::Failed(Stage::Process) => &self.processing_failures,
            MessageState::Failed(Stage::Acknowledge) => &self.acknowledge_failures,
            MessageState::Failed(Stage::Dispatch) => &self.dispatch_failures,
            // Intermediate states never reach the counters.
            _ => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            received: self.received.load(Ordering::Relaxed),
            acknowledged: self.acknowledged.load(Ordering::Relaxed),
            decode_failures: self.decode_failures.load(Ordering::Relaxed),
            processing_failures: self.processing_failures.load(Ordering::Relaxed),
            acknowledge_failures: self.acknowledge_failures.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            receive_errors: self.receive_errors.load(Ordering::Relaxed),
        }
    }
}
