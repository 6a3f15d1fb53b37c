//! Wire formats: the notification envelope and the transaction payload inside it.

pub mod json;
