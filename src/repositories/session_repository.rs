use crate::models::{SessionStatus, SessionSummary, SportSession};
use chrono::NaiveDateTime;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for sport session data access
pub struct SessionRepository {
    pool: PgPool,
}

impl SessionRepository {
    /// Create a new SessionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new session in the upcoming state
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        &self,
        sport_id: Uuid,
        host_id: Uuid,
        title: &str,
        description: Option<&str>,
        location: &str,
        date_time: NaiveDateTime,
        duration_minutes: i32,
        max_players: i32,
    ) -> SqlxResult<SportSession> {
        sqlx::query_as::<_, SportSession>(
            r#"
            INSERT INTO sport_sessions
                (sport_id, host_id, title, description, location, date_time, duration_minutes, max_players, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'upcoming')
            RETURNING
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            "#,
        )
        .bind(sport_id)
        .bind(host_id)
        .bind(title)
        .bind(description)
        .bind(location)
        .bind(date_time)
        .bind(duration_minutes)
        .bind(max_players)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a session by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<SportSession>> {
        sqlx::query_as::<_, SportSession>(
            r#"
            SELECT
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            FROM sport_sessions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// List sessions with optional sport and status filters, newest first,
    /// each with its participant count for list views
    pub async fn list(
        &self,
        sport_id: Option<Uuid>,
        status: Option<SessionStatus>,
    ) -> SqlxResult<Vec<SessionSummary>> {
        let status_str = status.map(|s| s.as_str());
        sqlx::query_as::<_, SessionSummary>(
            r#"
            SELECT
                s.id, s.sport_id, s.host_id, s.title, s.description, s.location,
                s.date_time, s.duration_minutes, s.max_players, s.status, s.created_at,
                COUNT(m.user_id) AS participant_count
            FROM sport_sessions s
            LEFT JOIN session_members m ON m.session_id = s.id
            WHERE ($1::uuid IS NULL OR s.sport_id = $1)
              AND ($2::text IS NULL OR s.status = $2)
            GROUP BY s.id
            ORDER BY s.created_at DESC
            "#,
        )
        .bind(sport_id)
        .bind(status_str)
        .fetch_all(&self.pool)
        .await
    }

    /// Apply a status transition only if the session is still in `from`.
    ///
    /// Returns `None` when the guard did not match, meaning a concurrent
    /// request or sweep already moved the session. Statuses never regress
    /// through this path.
    pub async fn transition_status(
        &self,
        id: Uuid,
        from: SessionStatus,
        to: SessionStatus,
    ) -> SqlxResult<Option<SportSession>> {
        let from_str = from.as_str();
        let to_str = to.as_str();
        sqlx::query_as::<_, SportSession>(
            r#"
            UPDATE sport_sessions
            SET status = $3
            WHERE id = $1 AND status = $2
            RETURNING
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            "#,
        )
        .bind(id)
        .bind(from_str)
        .bind(to_str)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find upcoming sessions whose start time has passed
    pub async fn find_due_starts(&self, now: NaiveDateTime) -> SqlxResult<Vec<SportSession>> {
        sqlx::query_as::<_, SportSession>(
            r#"
            SELECT
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            FROM sport_sessions
            WHERE status = 'upcoming' AND date_time <= $1
            ORDER BY date_time ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
    }

    /// Find running sessions whose end time has passed
    pub async fn find_due_ends(&self, now: NaiveDateTime) -> SqlxResult<Vec<SportSession>> {
        sqlx::query_as::<_, SportSession>(
            r#"
            SELECT
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            FROM sport_sessions
            WHERE status = 'in_progress'
              AND date_time + make_interval(mins => duration_minutes) <= $1
            ORDER BY date_time ASC
            "#,
        )
        .bind(now)
        .fetch_all(&self.pool)
        .await
    }
}
