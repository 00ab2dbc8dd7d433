use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Team within a session. Every session gets two teams at creation time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Team {
    pub id: Uuid,
    pub session_id: Uuid,
    pub name: String,
    pub created_at: NaiveDateTime,
}

impl Team {
    /// Create a new Team
    pub fn new(session_id: Uuid, name: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            name,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
