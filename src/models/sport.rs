use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Sport model carrying the team-size configuration for its sessions
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sport {
    pub id: Uuid,
    pub name: String,
    pub players_per_team: i32,
    pub created_at: NaiveDateTime,
}

impl Sport {
    /// Create a new Sport
    pub fn new(name: String, players_per_team: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            players_per_team,
            created_at: chrono::Utc::now().naive_utc(),
        }
    }
}
