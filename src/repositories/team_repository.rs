use crate::models::Team;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for team data access
pub struct TeamRepository {
    pool: PgPool,
}

impl TeamRepository {
    /// Create a new TeamRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new team for a session
    pub async fn create(&self, session_id: Uuid, name: &str) -> SqlxResult<Team> {
        sqlx::query_as::<_, Team>(
            r#"
            INSERT INTO teams (session_id, name)
            VALUES ($1, $2)
            RETURNING id, session_id, name, created_at
            "#,
        )
        .bind(session_id)
        .bind(name)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a team by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Team>> {
        sqlx::query_as::<_, Team>(
            r#"
            SELECT id, session_id, name, created_at
            FROM teams
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find all teams for a session
    pub async fn find_by_session(&self, session_id: Uuid) -> SqlxResult<Vec<Team>> {
        sqlx::query_as::<_, Team>(
            r#"
            SELECT id, session_id, name, created_at
            FROM teams
            WHERE session_id = $1
            ORDER BY name ASC
            "#,
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await
    }
}
