use crate::error::{AppError, AppResult};
use crate::models::Sport;
use crate::repositories::SportRepository;
use std::sync::Arc;
use tracing::info;

/// Service for managing the sport catalog
pub struct SportService {
    sport_repo: Arc<SportRepository>,
}

impl SportService {
    pub fn new(sport_repo: Arc<SportRepository>) -> Self {
        Self { sport_repo }
    }

    /// List all sports
    pub async fn list_sports(&self) -> AppResult<Vec<Sport>> {
        Ok(self.sport_repo.find_all().await?)
    }

    /// Add a sport to the catalog
    pub async fn create_sport(&self, name: &str, players_per_team: i32) -> AppResult<Sport> {
        let name = name.trim();

        if name.is_empty() {
            return Err(AppError::Validation("Sport name is required".into()));
        }
        if players_per_team < 1 {
            return Err(AppError::Validation(
                "Players per team must be at least 1".into(),
            ));
        }
        if self.sport_repo.find_by_name(name).await?.is_some() {
            return Err(AppError::Validation("Sport already exists".into()));
        }

        let sport = self.sport_repo.create(name, players_per_team).await?;

        info!("Created sport {} ({})", sport.name, sport.id);
        Ok(sport)
    }
}
