//! Queue adapters behind [`MessageQueue`](crate::domain::ports::MessageQueue).

pub mod in_memory;
#[cfg(feature = "queue-sqs")]
pub mod sqs;
