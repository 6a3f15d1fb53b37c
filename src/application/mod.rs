//! Application layer: the poll loop, the per-message pipeline and the default sink.
//!
//! [`dispatcher::Dispatcher`] receives batches and spawns one task per message
//! onto a bounded worker pool. Each task unwraps, decodes, hands the
//! transaction to the sink and acknowledges it; any failure leaves the message
//! for the queue to redeliver.

pub mod acknowledgement;
pub mod dispatcher;
pub mod reward;
pub mod stats;
pub mod worker;
