use crate::error::DecodeError;
use serde::Deserialize;

/// The part of an SNS-style notification the pipeline cares about.
///
/// Other notification attributes (`Type`, `TopicArn`, signatures, ...) are
/// ignored.
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "Message", default)]
    message: Option<String>,
}

/// Extracts the inner payload from a notification body without interpreting it.
pub fn unwrap_envelope(body: &str) -> Result<String, DecodeError> {
    let envelope: Envelope = serde_json::from_str(body).map_err(DecodeError::Envelope)?;
    envelope.message.ok_or(DecodeError::MissingMessage)
}

/// Wraps a serialized payload the way the notification topic does.
pub fn wrap_payload(payload: &str) -> String {
    serde_json::json!({
        "Type": "Notification",
        "Message": payload,
    })
    .to_string()
}
