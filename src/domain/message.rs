use std::fmt;

/// Opaque token identifying one delivery of a message.
///
/// Every receive hands out a fresh handle; only the handle of the current
/// delivery can acknowledge the message.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReceiptHandle(String);

impl ReceiptHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReceiptHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A message as handed out by the queue provider for a single delivery attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawMessage {
    pub message_id: String,
    pub receipt_handle: ReceiptHandle,
    pub body: String,
}

impl RawMessage {
    pub fn new(
        message_id: impl Into<String>,
        receipt_handle: ReceiptHandle,
        body: impl Into<String>,
    ) -> Self {
        Self {
            message_id: message_id.into(),
            receipt_handle,
            body: body.into(),
        }
    }
}
