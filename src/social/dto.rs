use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use super::repo_types::ConnectionRow;
use crate::auth::dto::is_valid_email;
use crate::error::{AppError, FieldIssue};

#[derive(Debug, Deserialize)]
pub struct FriendRequest {
    pub email: String,
}

impl FriendRequest {
    /// The lowercased email, or a field error.
    pub fn validated_email(&self) -> Result<String, AppError> {
        let email = self.email.trim().to_lowercase();
        if !is_valid_email(&email) {
            return Err(AppError::invalid_fields(vec![FieldIssue::new(
                "email",
                "invalid email",
            )]));
        }
        Ok(email)
    }
}

#[derive(Debug, Deserialize)]
pub struct RedeemRequest {
    pub code: String,
}

impl RedeemRequest {
    /// Codes are issued in upper case; input is trimmed and upper-cased.
    pub fn normalized_code(&self) -> Result<String, AppError> {
        let code = self.code.trim().to_uppercase();
        if code.is_empty() {
            return Err(AppError::invalid_fields(vec![FieldIssue::new(
                "code",
                "must not be empty",
            )]));
        }
        Ok(code)
    }
}

#[derive(Debug, Serialize)]
pub struct ConnectedUser {
    pub id: Uuid,
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub connected_user_id: Uuid,
    pub status: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub connected_user: ConnectedUser,
}

impl From<ConnectionRow> for ConnectionView {
    fn from(row: ConnectionRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            connected_user_id: row.connected_user_id,
            status: row.status,
            created_at: row.created_at,
            connected_user: ConnectedUser {
                id: row.connected_user_id,
                email: row.connected_email,
            },
        }
    }
}
