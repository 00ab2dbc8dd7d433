use crate::error::RepositoryError;
use crate::lifecycle;
use crate::models::{MemberProfile, SessionMember, SportSession, Team};
use chrono::NaiveDateTime;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for session membership data access.
///
/// Join, leave, and team-switch run inside a transaction that locks the
/// session row, so capacity checks for one session are serialized and two
/// users cannot both claim the last slot.
pub struct SessionMemberRepository {
    pool: PgPool,
}

impl SessionMemberRepository {
    /// Create a new SessionMemberRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Add a member without capacity checks.
    ///
    /// Only for freshly created sessions (the host auto-join); everyone else
    /// goes through `join_session`.
    pub async fn add_member(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        team_id: Option<Uuid>,
    ) -> SqlxResult<SessionMember> {
        sqlx::query_as::<_, SessionMember>(
            r#"
            INSERT INTO session_members (session_id, user_id, team_id)
            VALUES ($1, $2, $3)
            RETURNING session_id, user_id, team_id, joined_at
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(team_id)
        .fetch_one(&self.pool)
        .await
    }

    /// Join a session, optionally straight onto a team.
    ///
    /// Locks the session row, then verifies the roster is still open, the
    /// user has not already joined, and neither the session nor the requested
    /// team is full.
    pub async fn join_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        team_id: Option<Uuid>,
        now: NaiveDateTime,
    ) -> Result<SessionMember, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        // Lock the session row; concurrent joins for the same session queue here
        let session = sqlx::query_as::<_, SportSession>(
            r#"
            SELECT
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            FROM sport_sessions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Session not found".to_string()))?;

        if lifecycle::is_team_locked(session.status_enum(), session.date_time, now) {
            return Err(RepositoryError::BusinessRule(
                "Session can no longer be joined".to_string(),
            ));
        }

        let already = sqlx::query("SELECT 1 FROM session_members WHERE session_id = $1 AND user_id = $2")
            .bind(session_id)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
        if already.is_some() {
            return Err(RepositoryError::Duplicate(
                "User already joined this session".to_string(),
            ));
        }

        let participant_count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM session_members WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_one(&mut *tx)
        .await?;
        if participant_count >= session.max_players as i64 {
            return Err(RepositoryError::BusinessRule(format!(
                "Session is full: {} of {} players",
                participant_count, session.max_players
            )));
        }

        if let Some(team_id) = team_id {
            self.check_team_capacity(&mut tx, &session, team_id).await?;
        }

        let member = sqlx::query_as::<_, SessionMember>(
            r#"
            INSERT INTO session_members (session_id, user_id, team_id)
            VALUES ($1, $2, $3)
            RETURNING session_id, user_id, team_id, joined_at
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(team_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(member)
    }

    /// Assign or switch a member's team.
    ///
    /// Same locking discipline as `join_session`; the member must already be
    /// in the session and the target team must have room.
    pub async fn set_team(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        team_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<SessionMember, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, SportSession>(
            r#"
            SELECT
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            FROM sport_sessions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Session not found".to_string()))?;

        if lifecycle::is_team_locked(session.status_enum(), session.date_time, now) {
            return Err(RepositoryError::BusinessRule(
                "Teams are locked for this session".to_string(),
            ));
        }

        let member = sqlx::query_as::<_, SessionMember>(
            r#"
            SELECT session_id, user_id, team_id, joined_at
            FROM session_members
            WHERE session_id = $1 AND user_id = $2
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| {
            RepositoryError::BusinessRule("User is not a member of this session".to_string())
        })?;

        // Already on the requested team
        if member.team_id == Some(team_id) {
            tx.commit().await?;
            return Ok(member);
        }

        self.check_team_capacity(&mut tx, &session, team_id).await?;

        let updated = sqlx::query_as::<_, SessionMember>(
            r#"
            UPDATE session_members
            SET team_id = $3
            WHERE session_id = $1 AND user_id = $2
            RETURNING session_id, user_id, team_id, joined_at
            "#,
        )
        .bind(session_id)
        .bind(user_id)
        .bind(team_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Leave a session while the roster is still open.
    ///
    /// The host cannot leave their own session; they cancel it instead.
    pub async fn leave_session(
        &self,
        session_id: Uuid,
        user_id: Uuid,
        now: NaiveDateTime,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let session = sqlx::query_as::<_, SportSession>(
            r#"
            SELECT
                id, sport_id, host_id, title, description, location,
                date_time, duration_minutes, max_players, status, created_at
            FROM sport_sessions
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(session_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Session not found".to_string()))?;

        if lifecycle::is_team_locked(session.status_enum(), session.date_time, now) {
            return Err(RepositoryError::BusinessRule(
                "Session roster is locked".to_string(),
            ));
        }

        if session.host_id == user_id {
            return Err(RepositoryError::BusinessRule(
                "Host cannot leave their own session".to_string(),
            ));
        }

        let rows_affected =
            sqlx::query("DELETE FROM session_members WHERE session_id = $1 AND user_id = $2")
                .bind(session_id)
                .bind(user_id)
                .execute(&mut *tx)
                .await?
                .rows_affected();
        if rows_affected == 0 {
            return Err(RepositoryError::BusinessRule(
                "User is not a member of this session".to_string(),
            ));
        }

        tx.commit().await?;

        Ok(())
    }

    /// Verify the team belongs to the session and still has room
    async fn check_team_capacity(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        session: &SportSession,
        team_id: Uuid,
    ) -> Result<(), RepositoryError> {
        let team = sqlx::query_as::<_, Team>(
            r#"
            SELECT id, session_id, name, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(team_id)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| RepositoryError::NotFound("Team not found".to_string()))?;

        if team.session_id != session.id {
            return Err(RepositoryError::InvalidInput(
                "Team does not belong to this session".to_string(),
            ));
        }

        let players_per_team =
            sqlx::query_scalar::<_, i32>("SELECT players_per_team FROM sports WHERE id = $1")
                .bind(session.sport_id)
                .fetch_one(&mut **tx)
                .await?;

        let team_count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM session_members WHERE team_id = $1")
                .bind(team_id)
                .fetch_one(&mut **tx)
                .await?;

        if team_count >= players_per_team as i64 {
            return Err(RepositoryError::BusinessRule(format!(
                "Team {} is full: {} of {} players",
                team.name, team_count, players_per_team
            )));
        }

        Ok(())
    }

    /// Find all members of a session, oldest join first
    pub async fn find_by_session(&self, session_id: Uuid) -> SqlxResult<Vec<SessionMember>> {
        sqlx::query_as::<_, SessionMember>(
            r#"
            SELECT session_id, user_id, team_id, joined_at
            FROM session_members
            WHERE session_id = $1
            ORDER BY joined_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Find all members of a session with their public profiles
    pub async fn find_profiles_by_session(
        &self,
        session_id: Uuid,
    ) -> SqlxResult<Vec<MemberProfile>> {
        sqlx::query_as::<_, MemberProfile>(
            r#"
            SELECT m.user_id, u.username, m.team_id, m.joined_at
            FROM session_members m
            JOIN users u ON u.id = m.user_id
            WHERE m.session_id = $1
            ORDER BY m.joined_at ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
    }

    /// Check if a user is a member of a session
    pub async fn is_member(&self, session_id: Uuid, user_id: Uuid) -> SqlxResult<bool> {
        let result =
            sqlx::query("SELECT 1 FROM session_members WHERE session_id = $1 AND user_id = $2")
                .bind(session_id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(result.is_some())
    }

    /// Get participant count for a session
    pub async fn count_by_session(&self, session_id: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM session_members WHERE session_id = $1")
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
    }

    /// Get player count for a team
    pub async fn count_by_team(&self, team_id: Uuid) -> SqlxResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM session_members WHERE team_id = $1")
            .bind(team_id)
            .fetch_one(&self.pool)
            .await
    }
}
