pub mod envelope;
pub mod transaction_decoder;
