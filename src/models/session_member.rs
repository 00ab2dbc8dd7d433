use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Membership row linking a user to a session, optionally assigned to a team
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionMember {
    pub session_id: Uuid,
    pub user_id: Uuid,
    pub team_id: Option<Uuid>,
    pub joined_at: NaiveDateTime,
}

impl SessionMember {
    /// Create a new SessionMember with no team assignment yet
    pub fn new(session_id: Uuid, user_id: Uuid) -> Self {
        Self {
            session_id,
            user_id,
            team_id: None,
            joined_at: chrono::Utc::now().naive_utc(),
        }
    }
}

/// Membership row joined with the member's public profile, for lobby views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MemberProfile {
    pub user_id: Uuid,
    pub username: String,
    pub team_id: Option<Uuid>,
    pub joined_at: NaiveDateTime,
}
