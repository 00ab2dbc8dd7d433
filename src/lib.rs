//! Sportly Backend Library
//!
//! This module exposes the backend components for use by tests and other consumers.

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod lifecycle;
pub mod models;
pub mod repositories;
pub mod rest_api;
pub mod services;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use config::AuthConfig;
use repositories::*;
use services::{AuthService, SessionService, SportService};
use std::sync::Arc;

/// Application state containing all repositories and services
pub struct AppState {
    pub user_repo: Arc<UserRepository>,
    pub sport_repo: Arc<SportRepository>,
    pub session_repo: Arc<SessionRepository>,
    pub team_repo: Arc<TeamRepository>,
    pub member_repo: Arc<SessionMemberRepository>,
    pub auth_service: Arc<AuthService>,
    pub sport_service: Arc<SportService>,
    pub session_service: Arc<SessionService>,
    pub auth_config: AuthConfig,
}

impl AppState {
    /// Create a new AppState with initialized repositories and services
    pub fn new(pool: sqlx::PgPool, auth_config: AuthConfig) -> Self {
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let sport_repo = Arc::new(SportRepository::new(pool.clone()));
        let session_repo = Arc::new(SessionRepository::new(pool.clone()));
        let team_repo = Arc::new(TeamRepository::new(pool.clone()));
        let member_repo = Arc::new(SessionMemberRepository::new(pool));

        let auth_service = Arc::new(AuthService::new(user_repo.clone(), auth_config.clone()));
        let sport_service = Arc::new(SportService::new(sport_repo.clone()));
        let session_service = Arc::new(SessionService::new(
            session_repo.clone(),
            sport_repo.clone(),
            team_repo.clone(),
            member_repo.clone(),
            user_repo.clone(),
        ));

        Self {
            user_repo,
            sport_repo,
            session_repo,
            team_repo,
            member_repo,
            auth_service,
            sport_service,
            session_service,
            auth_config,
        }
    }
}
