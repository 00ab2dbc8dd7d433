use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Session lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Upcoming,
    InProgress,
    Completed,
    Cancelled,
    Terminated,
}

impl SessionStatus {
    /// Convert from database string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "upcoming" => Ok(SessionStatus::Upcoming),
            "in_progress" => Ok(SessionStatus::InProgress),
            "completed" => Ok(SessionStatus::Completed),
            "cancelled" => Ok(SessionStatus::Cancelled),
            "terminated" => Ok(SessionStatus::Terminated),
            _ => Err(format!("Invalid status: {}", s)),
        }
    }

    /// Convert to database string
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::InProgress => "in_progress",
            SessionStatus::Completed => "completed",
            SessionStatus::Cancelled => "cancelled",
            SessionStatus::Terminated => "terminated",
        }
    }

    /// Check if this status allows no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Cancelled | SessionStatus::Terminated
        )
    }

    /// Whether a transition from `self` to `to` is allowed.
    ///
    /// Transitions are monotonic along upcoming -> in_progress -> terminated.
    /// A host may cancel before start, and may mark a running or terminated
    /// session completed. Terminal states never regress.
    pub fn can_transition(&self, to: SessionStatus) -> bool {
        match (self, to) {
            (SessionStatus::Upcoming, SessionStatus::InProgress) => true,
            (SessionStatus::Upcoming, SessionStatus::Cancelled) => true,
            (SessionStatus::InProgress, SessionStatus::Terminated) => true,
            (SessionStatus::InProgress, SessionStatus::Completed) => true,
            (SessionStatus::Terminated, SessionStatus::Completed) => true,
            _ => false,
        }
    }
}

impl From<String> for SessionStatus {
    fn from(s: String) -> Self {
        Self::from_str(&s).unwrap_or(SessionStatus::Upcoming)
    }
}

impl From<SessionStatus> for String {
    fn from(status: SessionStatus) -> Self {
        status.as_str().to_string()
    }
}

/// Session model representing a scheduled sports meetup
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SportSession {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub date_time: NaiveDateTime,
    pub duration_minutes: i32,
    pub max_players: i32,
    pub status: String, // Stored as TEXT, use SessionStatus enum for type safety
    pub created_at: NaiveDateTime,
}

impl SportSession {
    /// Create a new SportSession
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sport_id: Uuid,
        host_id: Uuid,
        title: String,
        description: Option<String>,
        location: String,
        date_time: NaiveDateTime,
        duration_minutes: i32,
        max_players: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            sport_id,
            host_id,
            title,
            description,
            location,
            date_time,
            duration_minutes,
            max_players,
            status: SessionStatus::Upcoming.as_str().to_string(),
            created_at: chrono::Utc::now().naive_utc(),
        }
    }

    /// Get status as an enum
    pub fn status_enum(&self) -> SessionStatus {
        SessionStatus::from_str(&self.status).unwrap_or(SessionStatus::Upcoming)
    }

    /// Scheduled start time
    pub fn starts_at(&self) -> NaiveDateTime {
        self.date_time
    }

    /// Scheduled end time (start plus duration)
    pub fn ends_at(&self) -> NaiveDateTime {
        self.date_time + Duration::minutes(self.duration_minutes as i64)
    }

    /// Check if the session is waiting to start
    pub fn is_upcoming(&self) -> bool {
        self.status_enum() == SessionStatus::Upcoming
    }

    /// Check if the session is currently running
    pub fn is_in_progress(&self) -> bool {
        self.status_enum() == SessionStatus::InProgress
    }
}

/// Session row joined with its participant count, for list views
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionSummary {
    pub id: Uuid,
    pub sport_id: Uuid,
    pub host_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub location: String,
    pub date_time: NaiveDateTime,
    pub duration_minutes: i32,
    pub max_players: i32,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub participant_count: i64,
}
