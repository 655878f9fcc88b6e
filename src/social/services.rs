use rand::Rng;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use super::repo_types::InviteCode;
use crate::auth::repo_types::User;
use crate::error::AppError;

pub const INVITE_TTL: Duration = Duration::days(7);

/// Eight upper-case hex characters from four random bytes.
pub fn generate_invite_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    let bytes: [u8; 4] = rng.gen();
    bytes.iter().map(|b| format!("{b:02X}")).collect()
}

/// A used code is a conflict even when it has also expired.
pub fn check_redeemable(invite: &InviteCode, now: OffsetDateTime) -> Result<(), AppError> {
    if invite.used_by_user_id.is_some() {
        return Err(AppError::Conflict("Invite code already used".into()));
    }
    if now > invite.expires_at {
        return Err(AppError::Gone("Invite code has expired".into()));
    }
    Ok(())
}

/// The user a friend request points at, which must exist and not be the caller.
pub fn friend_target(caller: Uuid, target: Option<User>) -> Result<User, AppError> {
    let target = target.ok_or_else(|| AppError::NotFound("User not found".into()))?;
    if target.id == caller {
        return Err(AppError::validation("You cannot connect with yourself"));
    }
    Ok(target)
}
