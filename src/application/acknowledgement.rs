use crate::domain::message::ReceiptHandle;
use crate::domain::ports::MessageQueueRef;
use crate::error::{PipelineError, Result};

/// Removes successfully processed messages from the queue.
///
/// Failures are surfaced to the caller as-is; there is no retry here because
/// an unacknowledged message is redelivered by the provider anyway.
#[derive(Clone)]
pub struct AcknowledgementGateway {
    queue: MessageQueueRef,
}

impl AcknowledgementGateway {
    pub fn new(queue: MessageQueueRef) -> Self {
        Self { queue }
    }

    pub async fn acknowledge(&self, receipt: &ReceiptHandle) -> Result<()> {
        self.queue
            .delete(receipt)
            .await
            .map_err(PipelineError::Acknowledge)
    }
}
