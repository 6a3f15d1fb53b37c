use super::acknowledgement::AcknowledgementGateway;
use crate::domain::message::{RawMessage, ReceiptHandle};
use crate::domain::ports::TransactionSinkRef;
use crate::error::PipelineError;
use crate::interfaces::json::envelope::unwrap_envelope;
use crate::interfaces::json::transaction_decoder::decode_transaction;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::panic::AssertUnwindSafe;
use tracing::{Instrument, debug, error, info, info_span, warn};

/// The step of the per-message pipeline a failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// The message never reached a worker.
    Dispatch,
    Unwrap,
    Decode,
    Process,
    Acknowledge,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Dispatch => "dispatch",
            Stage::Unwrap => "unwrap",
            Stage::Decode => "decode",
            Stage::Process => "process",
            Stage::Acknowledge => "acknowledge",
        };
        f.write_str(name)
    }
}

/// Where a single delivery ended up.
///
/// Each step only runs once the previous one succeeded; `Failed` is terminal
/// and leaves the message on the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageState {
    Received,
    Unwrapped,
    Decoded,
    Processed,
    Acknowledged,
    Failed(Stage),
}

/// Outcome of handling one delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageReport {
    pub message_id: String,
    pub receipt_handle: ReceiptHandle,
    pub state: MessageState,
}

impl MessageReport {
    pub fn is_acknowledged(&self) -> bool {
        self.state == MessageState::Acknowledged
    }
}

/// Runs unwrap, decode, process and acknowledge for one message.
#[derive(Clone)]
pub(crate) struct MessageWorker {
    sink: TransactionSinkRef,
    acknowledger: AcknowledgementGateway,
}

impl MessageWorker {
    pub(crate) fn new(sink: TransactionSinkRef, acknowledger: AcknowledgementGateway) -> Self {
        Self { sink, acknowledger }
    }

    pub(crate) async fn handle(&self, message: RawMessage) -> MessageReport {
        let span = info_span!("message", message_id = %message.message_id);
        async move {
            let state = match self.advance(&message).await {
                Ok(state) => state,
                Err((Stage::Acknowledge, e)) => {
                    warn!(
                        stage = %Stage::Acknowledge,
                        error = %e,
                        "Processed message could not be acknowledged; it will be redelivered"
                    );
                    MessageState::Failed(Stage::Acknowledge)
                }
                Err((stage, e)) => {
                    error!(
                        stage = %stage,
                        error = %e,
                        "Error processing message; leaving it for redelivery"
                    );
                    MessageState::Failed(stage)
                }
            };
            MessageReport {
                message_id: message.message_id,
                receipt_handle: message.receipt_handle,
                state,
            }
        }
        .instrument(span)
        .await
    }

    async fn advance(&self, message: &RawMessage) -> Result<MessageState, (Stage, PipelineError)> {
        debug!(state = ?MessageState::Received, "Handling message");

        let payload = unwrap_envelope(&message.body)
            .map_err(|e| (Stage::Unwrap, PipelineError::Decode(e)))?;
        debug!(state = ?MessageState::Unwrapped, "Envelope unwrapped");

        let transaction = decode_transaction(&payload)
            .map_err(|e| (Stage::Decode, PipelineError::Decode(e)))?;
        debug!(
            state = ?MessageState::Decoded,
            transaction_id = %transaction.transaction_id,
            "Payload decoded"
        );

        // A panicking sink counts as a processing failure for this message only.
        AssertUnwindSafe(self.sink.process(&transaction))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(panic_message(panic).into()))
            .map_err(|e| (Stage::Process, PipelineError::Processing(e)))?;
        debug!(state = ?MessageState::Processed, "Transaction processed");

        self.acknowledger
            .acknowledge(&message.receipt_handle)
            .await
            .map_err(|e| (Stage::Acknowledge, e))?;

        info!(
            transaction_id = %transaction.transaction_id,
            "Successfully processed transaction"
        );
        Ok(MessageState::Acknowledged)
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic payload".to_string());
    format!("sink panicked: {detail}")
}
