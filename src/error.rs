use miette::Diagnostic;
use thiserror::Error;

/// Error type returned by a [`TransactionSink`](crate::domain::ports::TransactionSink).
pub type SinkError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Diagnostic, Debug)]
pub enum PipelineError {
    #[error("failed to receive messages: {0}")]
    #[diagnostic(code(reward_consumer::receive))]
    Receive(#[source] QueueError),
    #[error("failed to decode message: {0}")]
    #[diagnostic(code(reward_consumer::decode))]
    Decode(#[from] DecodeError),
    #[error("transaction processing failed: {0}")]
    #[diagnostic(code(reward_consumer::processing))]
    Processing(#[source] SinkError),
    #[error("failed to acknowledge message: {0}")]
    #[diagnostic(code(reward_consumer::acknowledge))]
    Acknowledge(#[source] QueueError),
    #[error("failed to dispatch message: {0}")]
    #[diagnostic(code(reward_consumer::dispatch))]
    Dispatch(String),
    #[error("invalid configuration: {0}")]
    #[diagnostic(code(reward_consumer::config))]
    Config(String),
    #[error("failed to read input: {0}")]
    #[diagnostic(code(reward_consumer::io))]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),
    #[error("envelope has no `Message` field")]
    MissingMessage,
    #[error("malformed transaction payload: {0}")]
    Payload(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum QueueError {
    #[error("queue provider error: {0}")]
    Provider(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("unknown receipt handle: {0}")]
    UnknownReceipt(String),
}

pub type Result<T> = std::result::Result<T, PipelineError>;
