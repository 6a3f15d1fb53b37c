use super::acknowledgement::AcknowledgementGateway;
use super::stats::{PipelineStats, StatsSnapshot};
use super::worker::{MessageReport, MessageState, MessageWorker, Stage};
use crate::domain::message::{RawMessage, ReceiptHandle};
use crate::domain::ports::{MessageQueueRef, ReceiveRequest, TransactionSinkRef};
use crate::error::{PipelineError, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, info, warn};

/// Tuning for the poll loop and the worker pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Period between two poll cycles.
    pub poll_interval: Duration,
    /// Largest batch requested per receive.
    pub max_messages: u32,
    /// Long-poll wait for each receive.
    pub wait_time: Duration,
    /// How long a received message stays hidden before it is redelivered.
    pub visibility_timeout: Duration,
    /// Number of messages handled concurrently across all cycles.
    pub worker_pool_size: usize,
    /// Stop after the first poll that returns no messages.
    pub stop_when_idle: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_messages: 10,
            wait_time: Duration::from_secs(20),
            visibility_timeout: Duration::from_secs(300),
            worker_pool_size: 5,
            stop_when_idle: false,
        }
    }
}

impl DispatcherConfig {
    pub fn receive_request(&self) -> ReceiveRequest {
        ReceiveRequest {
            max_messages: self.max_messages,
            wait_time: self.wait_time,
            visibility_timeout: self.visibility_timeout,
        }
    }
}

/// Tracks the tasks spawned for one received batch.
#[derive(Debug, Default)]
pub struct BatchHandle {
    tasks: Vec<(String, ReceiptHandle, JoinHandle<MessageReport>)>,
    stats: Arc<PipelineStats>,
}

impl BatchHandle {
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Waits until every message of the batch reached a final state.
    pub async fn join(self) -> BatchReport {
        let mut reports = Vec::with_capacity(self.tasks.len());
        for (message_id, receipt_handle, task) in self.tasks {
            match task.await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(message_id = %message_id, error = %e, "Message task did not complete");
                    let state = MessageState::Failed(Stage::Dispatch);
                    self.stats.record_outcome(state);
                    reports.push(MessageReport {
                        message_id,
                        receipt_handle,
                        state,
                    });
                }
            }
        }
        BatchReport { reports }
    }
}

/// Final states of every message in a batch, in receive order.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub reports: Vec<MessageReport>,
}

impl BatchReport {
    pub fn acknowledged(&self) -> usize {
        self.reports.iter().filter(|r| r.is_acknowledged()).count()
    }

    pub fn failed(&self) -> usize {
        self.reports.len() - self.acknowledged()
    }
}

/// Polls the queue on a fixed period and fans each batch out to a bounded
/// pool of workers.
///
/// Cycles are independent: a cycle that is still long-polling or waiting on
/// its batch does not hold back the next tick. The worker pool is shared by
/// all cycles, so no more than `worker_pool_size` messages are in the
/// sink at once.
#[derive(Clone)]
pub struct Dispatcher {
    queue: MessageQueueRef,
    worker: MessageWorker,
    config: DispatcherConfig,
    workers: Arc<Semaphore>,
    tracker: TaskTracker,
    stats: Arc<PipelineStats>,
    shutdown: CancellationToken,
}

impl Dispatcher {
    pub fn new(queue: MessageQueueRef, sink: TransactionSinkRef, config: DispatcherConfig) -> Self {
        let acknowledger = AcknowledgementGateway::new(queue.clone());
        Self {
            worker: MessageWorker::new(sink, acknowledger),
            workers: Arc::new(Semaphore::new(config.worker_pool_size.max(1))),
            tracker: TaskTracker::new(),
            stats: Arc::new(PipelineStats::new()),
            shutdown: CancellationToken::new(),
            queue,
            config,
        }
    }

    /// Replaces the token that stops [`Dispatcher::run`].
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Requests a graceful stop; in-flight messages are still finished.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Runs poll cycles until cancelled, then drains in-flight work.
    pub async fn run(&self) {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            max_messages = self.config.max_messages,
            wait_time_secs = self.config.wait_time.as_secs(),
            visibility_timeout_secs = self.config.visibility_timeout.as_secs(),
            worker_pool_size = self.config.worker_pool_size,
            "Starting dispatcher"
        );

        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let this = self.clone();
                    self.tracker.spawn(async move {
                        this.run_cycle().await;
                    });
                }
            }
        }

        info!(
            in_flight_tasks = self.tracker.len(),
            "Shutdown requested, draining in-flight messages"
        );
        self.tracker.close();
        self.tracker.wait().await;
        self.workers.close();
        info!("Dispatcher stopped");
    }

    /// One poll-and-dispatch cycle. Errors end the cycle and are only logged.
    ///
    /// Returns `None` when the receive itself failed.
    pub async fn run_cycle(&self) -> Option<BatchReport> {
        let batch = match self.poll_once().await {
            Ok(batch) => batch,
            Err(e) => {
                error!(error = %e, "Error polling messages from queue");
                return None;
            }
        };

        if batch.is_empty() {
            debug!("No messages received");
            if self.config.stop_when_idle && !self.shutdown.is_cancelled() {
                info!("Queue is idle, stopping dispatcher");
                self.shutdown.cancel();
            }
            return Some(BatchReport::default());
        }

        let report = batch.join().await;
        info!(
            batch_size = report.reports.len(),
            acknowledged = report.acknowledged(),
            failed = report.failed(),
            "Batch complete"
        );
        Some(report)
    }

    /// Receives one batch and dispatches it to the worker pool.
    ///
    /// A pending receive is abandoned when the dispatcher is cancelled; the
    /// returned handle is then empty.
    pub async fn poll_once(&self) -> Result<BatchHandle> {
        let request = self.config.receive_request();
        let received = tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => return Ok(BatchHandle::default()),
            received = self.queue.receive(&request) => received,
        };

        let messages = match received {
            Ok(messages) => messages,
            Err(e) => {
                self.stats.record_receive_error();
                return Err(PipelineError::Receive(e));
            }
        };

        if !messages.is_empty() {
            info!(batch_size = messages.len(), "Received messages from queue");
        }
        Ok(self.dispatch(messages))
    }

    /// Spawns one task per message. Tasks wait for a free worker slot, so
    /// this never blocks on a saturated pool.
    pub fn dispatch(&self, messages: Vec<RawMessage>) -> BatchHandle {
        self.stats.record_received(messages.len());

        let tasks = messages
            .into_iter()
            .map(|message| {
                let message_id = message.message_id.clone();
                let receipt_handle = message.receipt_handle.clone();
                let workers = self.workers.clone();
                let worker = self.worker.clone();
                let stats = self.stats.clone();

                let task = self.tracker.spawn(async move {
                    let report = match workers.acquire_owned().await {
                        Ok(permit) => {
                            let report = worker.handle(message).await;
                            drop(permit);
                            report
                        }
                        Err(_) => {
                            let e = PipelineError::Dispatch("worker pool is closed".to_string());
                            warn!(
                                message_id = %message.message_id,
                                stage = %Stage::Dispatch,
                                error = %e,
                                "Leaving message for redelivery"
                            );
                            MessageReport {
                                message_id: message.message_id,
                                receipt_handle: message.receipt_handle,
                                state: MessageState::Failed(Stage::Dispatch),
                            }
                        }
                    };
                    stats.record_outcome(report.state);
                    report
                });

                (message_id, receipt_handle, task)
            })
            .collect();

        BatchHandle {
            tasks,
            stats: self.stats.clone(),
        }
    }
}
