//! Response bodies for the REST endpoints.

use serde::{Deserialize, Serialize};

use crate::entities::{Channel, ReadReceipt, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: User,
}

/// Create, invite and remove all answer with the updated channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEnvelope {
    pub channel: Channel,
}

/// Mark-read answers with the updated message wrapped in `data`; only its
/// receipts are consumed, and they are required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkReadResponse {
    pub data: ReceiptsPayload,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptsPayload {
    pub read_by: Vec<ReadReceipt>,
}

/// Error body returned by failing endpoints
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn into_message(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_read_response_without_receipts_is_rejected() {
        let body = r#"{"data":{"_id":"m1","content":"x"}}"#;
        assert!(serde_json::from_str::<MarkReadResponse>(body).is_err());

        let missing_data = r#"{"success":true}"#;
        assert!(serde_json::from_str::<MarkReadResponse>(missing_data).is_err());
    }

    #[test]
    fn mark_read_response_extracts_receipts() {
        let body = r#"{"data":{"_id":"m1","readBy":[{"userId":"u2","readAt":"2024-05-01T10:01:00Z"}]}}"#;
        let response: MarkReadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.data.read_by.len(), 1);
        assert_eq!(response.data.read_by[0].user.id, "u2");
    }

    #[test]
    fn error_body_prefers_message_field() {
        let body: ErrorBody =
            serde_json::from_str(r#"{"message":"Channel not found","error":"x"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Channel not found"));

        let body: ErrorBody = serde_json::from_str(r#"{"error":"Forbidden"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Forbidden"));
    }
}
