use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::messages::repo::Message;
use crate::users::dto::PublicProfile;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub recipient_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub sneaker_id: Option<Uuid>,
}

/// One row of the inbox: a counterpart and the most recent message
/// exchanged with them. `contact` is null when the counterpart no longer
/// resolves to a user record.
#[derive(Debug, Serialize)]
pub struct ConversationSummary {
    pub counterpart_id: Uuid,
    pub contact: Option<PublicProfile>,
    pub last_message: Message,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn summary_serializes_null_contact_for_missing_counterpart() {
        let summary = ConversationSummary {
            counterpart_id: Uuid::new_v4(),
            contact: None,
            last_message: Message {
                id: Uuid::new_v4(),
                sender_id: Uuid::new_v4(),
                recipient_id: Uuid::new_v4(),
                content: "still here".into(),
                sneaker_id: None,
                created_at: OffsetDateTime::now_utc(),
            },
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"contact\":null"));
        assert!(json.contains("still here"));
    }

    #[test]
    fn send_request_sneaker_ref_is_optional() {
        let json = format!(
            r#"{{"recipientId":"{}","content":"is it still available?"}}"#,
            Uuid::new_v4()
        );
        let req: SendMessageRequest = serde_json::from_str(&json).unwrap();
        assert!(req.sneaker_id.is_none());
    }
}
