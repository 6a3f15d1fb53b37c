use crate::domain::ports::TransactionSink;
use crate::domain::transaction::Transaction;
use crate::error::SinkError;
use async_trait::async_trait;
use tracing::info;

/// Default sink wired into the binary.
///
/// Reward calculation lives downstream; this only records that the
/// transaction reached the reward stage.
#[derive(Debug, Default, Clone)]
pub struct RewardService;

impl RewardService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransactionSink for RewardService {
    async fn process(&self, transaction: &Transaction) -> Result<(), SinkError> {
        info!(
            transaction_id = %transaction.transaction_id,
            user_id = %transaction.user_id,
            amount = %transaction.amount,
            merchant_id = %transaction.merchant_id,
            category = %transaction.category,
            "Processing transaction"
        );
        Ok(())
    }
}
