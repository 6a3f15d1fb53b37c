use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A non-blank identifier carried by a transaction event.
///
/// Deserialization rejects empty or whitespace-only values so a decoded
/// [`Transaction`] always carries a usable id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    pub fn new(value: impl Into<String>) -> Result<Self, InvalidIdentifier> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(InvalidIdentifier)
        } else {
            Ok(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidIdentifier;

impl fmt::Display for InvalidIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("identifier must not be blank")
    }
}

impl TryFrom<String> for Identifier {
    type Error = InvalidIdentifier;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A purchase event published by the transaction service.
///
/// Every field is required on the wire; a payload missing any of them is
/// rejected instead of being filled with defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub transaction_id: Identifier,
    pub user_id: Identifier,
    pub amount: Decimal,
    pub merchant_id: String,
    pub category: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

/// Accepts RFC 3339 timestamps as well as offset-less local date-times,
/// which are read as UTC.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid timestamp `{raw}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_identifier_rejects_blank() {
        assert!(Identifier::new("t1").is_ok());
        assert_eq!(Identifier::new(""), Err(InvalidIdentifier));
        assert_eq!(Identifier::new("   "), Err(InvalidIdentifier));
    }

    #[test]
    fn test_transaction_deserialization() {
        let json = r#"{
            "transactionId": "t1",
            "userId": "u1",
            "amount": 12.50,
            "merchantId": "m-42",
            "category": "groceries",
            "timestamp": "2024-03-01T10:15:30Z",
            "status": "COMPLETED"
        }"#;

        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.transaction_id.as_str(), "t1");
        assert_eq!(tx.user_id.as_str(), "u1");
        assert_eq!(tx.amount, dec!(12.50));
        assert_eq!(tx.merchant_id, "m-42");
        assert_eq!(tx.category, "groceries");
        assert_eq!(
            tx.timestamp,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 15, 30).unwrap()
        );
        assert_eq!(tx.status, "COMPLETED");
    }

    #[test]
    fn test_amount_keeps_currency_precision() {
        let json = r#"{"transactionId":"t1","userId":"u1","amount":0.10,
            "merchantId":"m","category":"c","timestamp":"2024-03-01T10:15:30Z","status":"s"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.amount.to_string(), "0.10");
    }

    #[test]
    fn test_local_timestamp_is_read_as_utc() {
        let json = r#"{"transactionId":"t1","userId":"u1","amount":"3.00",
            "merchantId":"m","category":"c","timestamp":"2024-03-01T10:15:30.250","status":"s"}"#;
        let tx: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(tx.timestamp.timestamp_millis() % 1000, 250);
        assert_eq!(tx.amount, dec!(3.00));
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"{"transactionId":"t1","userId":"u1","amount":1,
            "merchantId":"m","category":"c","timestamp":"2024-03-01T10:15:30Z"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }

    #[test]
    fn test_blank_transaction_id_is_rejected() {
        let json = r#"{"transactionId":"","userId":"u1","amount":1,
            "merchantId":"m","category":"c","timestamp":"2024-03-01T10:15:30Z","status":"s"}"#;
        assert!(serde_json::from_str::<Transaction>(json).is_err());
    }
}
