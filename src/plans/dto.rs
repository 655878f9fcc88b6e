use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{ChatRecord, PlanRecord};
use crate::error::{AppError, FieldIssue};

pub const MESSAGE_MAX_CHARS: usize = 4000;

/// Older clients also send `customerId`. It is ignored; the token decides
/// who the plan is for.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
}

impl ChatRequest {
    /// The trimmed message, rejected when empty or longer than 4000 chars.
    pub fn validated_message(&self) -> Result<&str, AppError> {
        let message = self.message.trim();
        let chars = message.chars().count();
        if chars == 0 || chars > MESSAGE_MAX_CHARS {
            return Err(AppError::invalid_fields(vec![FieldIssue::new(
                "message",
                format!("must be between 1 and {MESSAGE_MAX_CHARS} characters"),
            )]));
        }
        Ok(message)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPlansResponse {
    pub customer_id: Uuid,
    pub latest_diet_plan: Option<PlanRecord>,
    pub latest_workout_plan: Option<PlanRecord>,
    pub recent_messages: Vec<ChatRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(body: serde_json::Value) -> ChatRequest {
        serde_json::from_value(body).unwrap()
    }

    #[test]
    fn customer_id_in_the_body_is_ignored() {
        let r = request(json!({"message": "hi", "customerId": 42}));
        assert_eq!(r.message, "hi");
        let r = request(json!({"message": "hi", "customerId": "abc"}));
        assert_eq!(r.message, "hi");
    }

    #[test]
    fn message_is_trimmed() {
        let r = request(json!({"message": "  more protein  "}));
        assert_eq!(r.validated_message().unwrap(), "more protein");
    }

    #[test]
    fn blank_and_oversized_messages_are_rejected() {
        let blank = request(json!({"message": "   "}));
        assert!(matches!(
            blank.validated_message(),
            Err(AppError::Validation { .. })
        ));

        let long = request(json!({"message": "a".repeat(MESSAGE_MAX_CHARS + 1)}));
        assert!(long.validated_message().is_err());

        let edge = request(json!({"message": "é".repeat(MESSAGE_MAX_CHARS)}));
        assert!(edge.validated_message().is_ok());
    }
}
