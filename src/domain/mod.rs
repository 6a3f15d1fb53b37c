//! Domain model and the ports the pipeline is wired through.

pub mod message;
pub mod ports;
pub mod transaction;
