use crate::domain::transaction::Transaction;
use crate::error::DecodeError;

/// Decodes a transaction payload.
///
/// Either a complete [`Transaction`] comes back or nothing does; missing or
/// mistyped fields are never defaulted.
pub fn decode_transaction(payload: &str) -> Result<Transaction, DecodeError> {
    serde_json::from_str(payload).map_err(DecodeError::Payload)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::transaction::Identifier;
    use crate::interfaces::json::envelope::{unwrap_envelope, wrap_payload};
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample() -> Transaction {
        Transaction {
            transaction_id: Identifier::new("9f1c2d7e-0b8a-4c55-9e0f-3b1f6a2d8c44").unwrap(),
            user_id: Identifier::new("u-1001").unwrap(),
            amount: dec!(149.99),
            merchant_id: "merchant-7".to_string(),
            category: "electronics".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 11, 29, 8, 0, 0).unwrap(),
            status: "COMPLETED".to_string(),
        }
    }

    #[test]
    fn test_unwrap_and_decode_reconstructs_transaction() {
        let tx = sample();
        let body = wrap_payload(&serde_json::to_string(&tx).unwrap());

        let decoded = decode_transaction(&unwrap_envelope(&body).unwrap()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn test_decode_concrete_envelope() {
        let body =
            r#"{"Message": "{\"transactionId\":\"t1\",\"userId\":\"u1\",\"amount\":12.50,\"merchantId\":\"m1\",\"category\":\"dining\",\"timestamp\":\"2024-05-01T12:00:00\",\"status\":\"COMPLETED\"}"}"#;

        let tx = decode_transaction(&unwrap_envelope(body).unwrap()).unwrap();
        assert_eq!(tx.transaction_id.as_str(), "t1");
        assert_eq!(tx.amount, dec!(12.50));
    }

    #[test]
    fn test_decode_rejects_mistyped_amount() {
        let payload = r#"{"transactionId":"t1","userId":"u1","amount":"lots",
            "merchantId":"m1","category":"c","timestamp":"2024-05-01T12:00:00Z","status":"s"}"#;
        assert!(matches!(
            decode_transaction(payload),
            Err(DecodeError::Payload(_))
        ));
    }

    #[test]
    fn test_decode_accepts_quoted_amount() {
        let payload = r#"{"transactionId":"t4","userId":"u1","amount":"8.00",
            "merchantId":"m1","category":"c","timestamp":"2024-05-01T12:00:00Z","status":"s"}"#;
        assert_eq!(decode_transaction(payload).unwrap().amount, dec!(8.00));
    }

    #[test]
    fn test_decode_rejects_bad_timestamp() {
        let payload = r#"{"transactionId":"t1","userId":"u1","amount":1,
            "merchantId":"m1","category":"c","timestamp":"yesterday","status":"s"}"#;
        assert!(decode_transaction(payload).is_err());
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let payload = r#"{"transactionId":"t1","userId":"u1","amount":1,"description":"extra",
            "merchantId":"m1","category":"c","timestamp":"2024-05-01T12:00:00Z","status":"s"}"#;
        assert!(decode_transaction(payload).is_ok());
    }
}
