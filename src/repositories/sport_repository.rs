use crate::models::Sport;
use sqlx::{PgPool, Result as SqlxResult};
use uuid::Uuid;

/// Repository for sport data access
pub struct SportRepository {
    pool: PgPool,
}

impl SportRepository {
    /// Create a new SportRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new sport
    pub async fn create(&self, name: &str, players_per_team: i32) -> SqlxResult<Sport> {
        sqlx::query_as::<_, Sport>(
            r#"
            INSERT INTO sports (name, players_per_team)
            VALUES ($1, $2)
            RETURNING id, name, players_per_team, created_at
            "#,
        )
        .bind(name)
        .bind(players_per_team)
        .fetch_one(&self.pool)
        .await
    }

    /// Find a sport by UUID
    pub async fn find_by_id(&self, id: Uuid) -> SqlxResult<Option<Sport>> {
        sqlx::query_as::<_, Sport>(
            r#"
            SELECT id, name, players_per_team, created_at
            FROM sports
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    /// Find a sport by name (case-insensitive)
    pub async fn find_by_name(&self, name: &str) -> SqlxResult<Option<Sport>> {
        sqlx::query_as::<_, Sport>(
            r#"
            SELECT id, name, players_per_team, created_at
            FROM sports
            WHERE LOWER(name) = LOWER($1)
            "#,
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
    }

    /// List all sports, alphabetically
    pub async fn find_all(&self) -> SqlxResult<Vec<Sport>> {
        sqlx::query_as::<_, Sport>(
            r#"
            SELECT id, name, players_per_team, created_at
            FROM sports
            ORDER BY name ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
