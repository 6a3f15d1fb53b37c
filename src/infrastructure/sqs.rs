use crate::domain::message::{RawMessage, ReceiptHandle};
use crate::domain::ports::{MessageQueue, ReceiveRequest};
use crate::error::QueueError;
use async_trait::async_trait;
use aws_sdk_sqs::Client;
use tracing::warn;

/// SQS bound to a single queue URL.
///
/// Credentials and region come from the default AWS provider chain. An
/// explicit endpoint (e.g. LocalStack) is honoured through `AWS_ENDPOINT_URL`.
#[derive(Clone)]
pub struct SqsQueue {
    client: Client,
    queue_url: String,
}

impl SqsQueue {
    pub fn new(client: Client, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Builds a client from the ambient AWS configuration.
    pub async fn connect(queue_url: impl Into<String>) -> Self {
        let config = aws_config::load_from_env().await;
        Self::new(Client::new(&config), queue_url)
    }

    pub fn queue_url(&self) -> &str {
        &self.queue_url
    }
}

fn seconds(duration: std::time::Duration) -> i32 {
    i32::try_from(duration.as_secs()).unwrap_or(i32::MAX)
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn receive(&self, request: &ReceiveRequest) -> Result<Vec<RawMessage>, QueueError> {
        let output = self
            .client
            .receive_message()
            .queue_url(&self.queue_url)
            .max_number_of_messages(i32::try_from(request.max_messages).unwrap_or(10))
            .wait_time_seconds(seconds(request.wait_time))
            .visibility_timeout(seconds(request.visibility_timeout))
            .send()
            .await
            .map_err(|e| QueueError::Provider(Box::new(e)))?;

        let messages = output
            .messages
            .unwrap_or_default()
            .into_iter()
            .filter_map(|message| {
                let message_id = message.message_id.unwrap_or_default();
                let Some(receipt) = message.receipt_handle else {
                    warn!(message_id = %message_id, "Skipping message without receipt handle");
                    return None;
                };
                Some(RawMessage::new(
                    message_id,
                    ReceiptHandle::new(receipt),
                    message.body.unwrap_or_default(),
                ))
            })
            .collect();
        Ok(messages)
    }

    async fn delete(&self, receipt: &ReceiptHandle) -> Result<(), QueueError> {
        self.client
            .delete_message()
            .queue_url(&self.queue_url)
            .receipt_handle(receipt.as_str())
            .send()
            .await
            .map_err(|e| QueueError::Provider(Box::new(e)))?;
        Ok(())
    }
}
